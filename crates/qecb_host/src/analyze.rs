//! Offline analysis of a collected trial log.
//!
//! Aggregates every configuration of a log and fits the scaling of mean
//! stabilization time with code distance. Configurations are independent,
//! so they are aggregated in parallel; failures stay with the configuration
//! or fit that produced them.

use crate::stats;
use anyhow::{Context, Result};
use qecb_common::model::{Configuration, FittingDatum};
use qecb_core::BenchError;
use qecb_core::aggregate::{AggregateStats, aggregate_with_margin};
use qecb_core::fit::{PowerLawFit, fit_power_law, fitting_data};
use qecb_io::parser::{self, TrialLog};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{info, warn};

/// Tunables of the offline pipeline.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
    pub tail_margin: f64,
    pub min_fit_distance: u32,
}

/// Aggregation outcome for one configuration.
#[derive(Debug)]
pub struct ConfigurationReport {
    pub configuration: Configuration,
    pub stats: Result<AggregateStats, BenchError>,
}

impl ConfigurationReport {
    /// The configuration rendered back as its JSON header.
    pub fn header(&self) -> String {
        serde_json::to_string(&self.configuration).unwrap_or_else(|_| format!("{:?}", self.configuration))
    }
}

/// Results of the offline pipeline, in log order.
#[derive(Debug)]
pub struct Analysis {
    pub fixed_configuration: Option<Value>,
    pub configurations: Vec<ConfigurationReport>,
    pub fitting_data: Vec<FittingDatum>,
    pub fit: Result<PowerLawFit, BenchError>,
}

/// Aggregates and fits an already parsed log.
pub fn analyze(log: &TrialLog, config: AnalysisConfig) -> Analysis {
    let configurations: Vec<ConfigurationReport> = log
        .groups
        .par_iter()
        .map(|group| ConfigurationReport {
            configuration: group.configuration.clone(),
            stats: aggregate_with_margin(&group.records, config.tail_margin),
        })
        .collect();

    for report in &configurations {
        if let Err(err) = &report.stats {
            warn!(configuration = %report.header(), %err, "configuration not aggregated");
        }
    }

    let data = fitting_data(
        configurations
            .iter()
            .filter_map(|report| report.stats.as_ref().ok().map(|s| (&report.configuration, s))),
        config.min_fit_distance,
    );
    let fit = fit_power_law(&data);
    if let Err(err) = &fit {
        warn!(%err, points = data.len(), "scaling fit unavailable");
    }

    Analysis {
        fixed_configuration: log.fixed_configuration.clone(),
        configurations,
        fitting_data: data,
        fit,
    }
}

/// Loads a trial log, analyzes it, and prints the report.
pub fn run_analysis(log_path: &str, config: AnalysisConfig) -> Result<()> {
    info!(path = log_path, "loading trial log");
    let log = parser::load_trial_log(log_path)
        .with_context(|| format!("Failed to load trial log {}", log_path))?;
    info!(
        configurations = log.groups.len(),
        records = log.record_count(),
        "trial log loaded"
    );

    let analysis = analyze(&log, config);
    stats::print_report(&analysis);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: AnalysisConfig = AnalysisConfig {
        tail_margin: 0.1,
        min_fit_distance: 4,
    };

    fn record(error: bool, stable: f64) -> String {
        format!(
            "{{\"error\":{},\"time_build_decoders\":0.5,\"time_run_to_stable\":{}}}\n",
            error, stable
        )
    }

    #[test]
    fn fits_quadratic_log() {
        let mut input = String::from("#f {\"code\":\"xzzx\"}\n");
        for di in [3u32, 4, 6, 8] {
            input.push_str(&format!("# {{\"di\":{}}}\n", di));
            let t = f64::from(di * di);
            input.push_str(&record(false, t * 0.9));
            input.push_str(&record(false, t * 1.1));
            input.push_str(&record(true, 0.0));
        }
        let log = parser::parse_trial_log(input.as_bytes()).unwrap();
        let analysis = analyze(&log, CONFIG);

        assert_eq!(analysis.configurations.len(), 4);
        assert_eq!(analysis.fitting_data.len(), 3);
        let fit = analysis.fit.unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.r_square - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_configuration_does_not_stop_siblings() {
        let input = format!(
            "# {{\"di\":5}}\n# {{\"di\":7}}\n{}{}",
            record(false, 3.0),
            record(true, 0.0)
        );
        let log = parser::parse_trial_log(input.as_bytes()).unwrap();
        let analysis = analyze(&log, CONFIG);

        assert!(matches!(
            analysis.configurations[0].stats,
            Err(BenchError::DivisionByZero)
        ));
        let stats = analysis.configurations[1].stats.as_ref().unwrap();
        assert_eq!(stats.error_count, 1);
        assert!(matches!(analysis.fit, Err(BenchError::InsufficientData(_))));
    }
}
