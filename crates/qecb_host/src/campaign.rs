//! Live sweep campaign over the threshold table.
//!
//! Runs one sweep per selected Pauli ratio, strictly one after another.
//! Each sweep's output is written once, when that sweep ends. A failing
//! sweep leaves no output of its own and does not touch the files of
//! sweeps that already completed; the campaign moves on to the next ratio.

use anyhow::{Context, Result, bail};
use qecb_common::model::float_repr;
use qecb_core::BenchError;
use qecb_core::sweep::{PointEvaluator, StopReason, SweepController, SweepParams};
use qecb_io::loader::{self, ThresholdEntry};
use qecb_io::writer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Campaign-wide sweep settings; the ratio and threshold come per table row.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub out_dir: PathBuf,
    pub di: u32,
    pub decay: f64,
    pub max_points: usize,
    pub min_error_cases: u64,
    pub max_n: u64,
}

impl CampaignConfig {
    fn sweep_params(&self, entry: &ThresholdEntry) -> SweepParams {
        SweepParams {
            pauli_ratio: entry.pauli_ratio,
            threshold: entry.threshold,
            di: self.di,
            decay: self.decay,
            max_points: self.max_points,
            min_error_cases: self.min_error_cases,
            max_n: self.max_n,
        }
    }
}

/// Sweep that finished and was persisted.
#[derive(Debug)]
pub struct CompletedSweep {
    pub pauli_ratio: f64,
    pub path: PathBuf,
    pub points: usize,
    pub stop: StopReason,
}

/// Per-ratio outcomes of a campaign.
#[derive(Debug, Default)]
pub struct CampaignReport {
    pub completed: Vec<CompletedSweep>,
    pub failed: Vec<(f64, BenchError)>,
}

/// Runs and persists one sweep.
fn run_one<E: PointEvaluator + ?Sized>(
    config: &CampaignConfig,
    entry: &ThresholdEntry,
    evaluator: &mut E,
) -> qecb_core::Result<CompletedSweep> {
    let controller = SweepController::new(config.sweep_params(entry));
    let outcome = controller.run(evaluator)?;
    let path = writer::write_sweep_output(&config.out_dir, &outcome)?;
    Ok(CompletedSweep {
        pauli_ratio: entry.pauli_ratio,
        path,
        points: outcome.points.len(),
        stop: outcome.stop,
    })
}

/// Sweeps every threshold entry in table order.
pub fn run_campaign<E: PointEvaluator + ?Sized>(
    config: &CampaignConfig,
    entries: &[ThresholdEntry],
    evaluator: &mut E,
) -> CampaignReport {
    let mut report = CampaignReport::default();

    for entry in entries {
        info!(
            pauli_ratio = entry.pauli_ratio,
            threshold = entry.threshold,
            "running sweep"
        );
        match run_one(config, entry, evaluator) {
            Ok(done) => {
                info!(
                    pauli_ratio = done.pauli_ratio,
                    points = done.points,
                    stop = ?done.stop,
                    "sweep complete"
                );
                report.completed.push(done);
            }
            Err(err) => {
                error!(pauli_ratio = entry.pauli_ratio, %err, "sweep failed");
                report.failed.push((entry.pauli_ratio, err));
            }
        }
    }

    report
}

/// Loads the threshold table and runs the campaign against `evaluator`.
pub fn run_sweeps<E: PointEvaluator + ?Sized>(
    thresholds_path: &Path,
    config: &CampaignConfig,
    evaluator: &mut E,
) -> Result<()> {
    let entries = loader::load_threshold_table(thresholds_path).with_context(|| {
        format!("Failed to load threshold table {}", thresholds_path.display())
    })?;
    let ratios: Vec<f64> = entries.iter().map(|e| e.pauli_ratio).collect();
    info!(?ratios, "selected pauli ratios");

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create {}", config.out_dir.display()))?;

    let report = run_campaign(config, &entries, evaluator);

    println!("Campaign Results");
    for done in &report.completed {
        let stop = match done.stop {
            StopReason::Exhausted => "ladder exhausted".to_string(),
            StopReason::EarlyStop { index } => format!("early stop at point {}", index),
        };
        println!(
            "pauli_ratio {}: {} points, {} -> {}",
            float_repr(done.pauli_ratio),
            done.points,
            stop,
            done.path.display()
        );
    }
    for (ratio, err) in &report.failed {
        println!("pauli_ratio {}: FAILED ({})", float_repr(*ratio), err);
    }

    if !report.failed.is_empty() {
        bail!("{} of {} sweeps failed", report.failed.len(), entries.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qecb_common::model::{SweepPoint, SweepRequest};

    fn config(out_dir: &Path) -> CampaignConfig {
        CampaignConfig {
            out_dir: out_dir.to_path_buf(),
            di: 5,
            decay: 0.8,
            max_points: 200,
            min_error_cases: 6000,
            max_n: 100_000_000,
        }
    }

    fn entry(pauli_ratio: f64, threshold: f64) -> ThresholdEntry {
        ThresholdEntry {
            pauli_ratio,
            threshold,
            deviation: 0.0,
        }
    }

    fn point(request: &SweepRequest, error_count: u64) -> SweepPoint {
        SweepPoint {
            p_ratio: request.p_ratio,
            p: request.p,
            error_count,
            error_rate: 0.01,
            confidence_interval: 0.02,
            raw: format!("raw {}", request.index),
        }
    }

    #[test]
    fn failed_sweep_leaves_others_intact() {
        let dir = tempfile::tempdir().unwrap();
        let earlier = writer::sweep_output_path(dir.path(), 0.05);
        fs::write(&earlier, "previous campaign\n").unwrap();

        let entries = [entry(0.0, 0.04), entry(0.05, 0.03), entry(1.0, 0.007)];
        let mut evaluate = |request: &SweepRequest| -> qecb_core::Result<SweepPoint> {
            if request.p_pauli > 0.0 && request.p_erasure > 0.0 {
                return Err(BenchError::ExternalInvocationFailure {
                    status: Some(1),
                    detail: "command fails".to_string(),
                });
            }
            // Two trustworthy points, then too few errors.
            Ok(point(request, if request.index < 2 { 6000 } else { 10 }))
        };

        let report = run_campaign(&config(dir.path()), &entries, &mut evaluate);

        assert_eq!(report.completed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 0.05);
        assert_eq!(fs::read_to_string(&earlier).unwrap(), "previous campaign\n");

        let first = fs::read_to_string(writer::sweep_output_path(dir.path(), 0.0)).unwrap();
        assert_eq!(first.lines().count(), 3);
        assert!(first.ends_with("raw 2\n"));
        assert_eq!(report.completed[1].stop, StopReason::EarlyStop { index: 2 });
    }

    #[test]
    fn run_sweeps_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("thresholds.txt");
        fs::write(&table, "0.1 0.02 0.001\n0.2 0.01 0.001\n").unwrap();
        let out = dir.path().join("out");

        let mut failing = |_: &SweepRequest| -> qecb_core::Result<SweepPoint> {
            Err(BenchError::ExternalInvocationFailure {
                status: None,
                detail: "killed".to_string(),
            })
        };
        assert!(run_sweeps(&table, &config(&out), &mut failing).is_err());
        assert!(!writer::sweep_output_path(&out, 0.1).exists());

        let mut quiet = |r: &SweepRequest| -> qecb_core::Result<SweepPoint> { Ok(point(r, 0)) };
        run_sweeps(&table, &config(&out), &mut quiet).unwrap();
        let written = fs::read_to_string(writer::sweep_output_path(&out, 0.1)).unwrap();
        assert_eq!(written, "1.0 0.02 raw 0\n");
    }
}
