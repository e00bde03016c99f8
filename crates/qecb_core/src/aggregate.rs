//! Timing statistics for one decoder configuration.
//!
//! Failed trials only contribute to the error count; their timings are
//! reported as zero by the simulator and are excluded from every mean and
//! tail. The tail is read from the sorted successful timings at an index
//! shifted down by a fraction of the failure count, which treats part of
//! the failures as if they had been slow successes.

use crate::{BenchError, Result};
use qecb_common::analysis::TAIL_MARGIN;
use qecb_common::model::{Metric, TrialRecord};
use tracing::debug;

/// Mean and tail of one timing metric over successful trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub mean: f64,
    pub tail: f64,
}

/// Summaries of the three timing metrics of a configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingStats {
    pub build_decoders: MetricSummary,
    pub run_to_stable: MetricSummary,
    pub build_decoders_run_to_stable: MetricSummary,
}

impl TimingStats {
    pub fn get(&self, metric: Metric) -> MetricSummary {
        match metric {
            Metric::BuildDecoders => self.build_decoders,
            Metric::RunToStable => self.run_to_stable,
            Metric::BuildDecodersRunToStable => self.build_decoders_run_to_stable,
        }
    }
}

/// Aggregate view of every trial recorded under one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    pub error_count: usize,
    pub success_count: usize,
    pub error_rate: f64,

    /// Index into the sorted successful timings used for the tail.
    ///
    /// `None` together with `timings` when no trial succeeded.
    pub upper_idx: Option<usize>,

    /// Timing summaries, `None` when there is no successful trial.
    ///
    /// All three metrics share this single policy so a report never mixes
    /// real values with placeholders.
    pub timings: Option<TimingStats>,
}

/// Aggregates records with the default tail margin.
pub fn aggregate(records: &[TrialRecord]) -> Result<AggregateStats> {
    aggregate_with_margin(records, TAIL_MARGIN)
}

/// Aggregates records, reserving `margin * error_count` tail slots.
///
/// # Errors
///
/// Returns `DivisionByZero` when `records` is empty, since the error rate
/// is undefined.
pub fn aggregate_with_margin(records: &[TrialRecord], margin: f64) -> Result<AggregateStats> {
    if records.is_empty() {
        return Err(BenchError::DivisionByZero);
    }

    let (failures, successes): (Vec<&TrialRecord>, Vec<&TrialRecord>) =
        records.iter().partition(|record| record.error);
    let error_count = failures.len();
    let success_count = successes.len();
    let error_rate = error_count as f64 / (error_count + success_count) as f64;

    if success_count == 0 {
        debug!(error_count, "no successful trials, timing statistics omitted");
        return Ok(AggregateStats {
            error_count,
            success_count,
            error_rate,
            upper_idx: None,
            timings: None,
        });
    }

    let upper_idx = tail_index(success_count, error_count, margin)?;
    let summarize = |metric: Metric| {
        let values: Vec<f64> = successes.iter().map(|record| record.metric(metric)).collect();
        summarize_metric(values, upper_idx)
    };

    Ok(AggregateStats {
        error_count,
        success_count,
        error_rate,
        upper_idx: Some(upper_idx),
        timings: Some(TimingStats {
            build_decoders: summarize(Metric::BuildDecoders),
            run_to_stable: summarize(Metric::RunToStable),
            build_decoders_run_to_stable: summarize(Metric::BuildDecodersRunToStable),
        }),
    })
}

/// Computes `clamp(success_count - floor(error_count * margin), 0, success_count - 1)`.
///
/// # Errors
///
/// Returns `NoSuccessfulTrials` when `success_count` is zero; there is no
/// valid index to clamp into.
pub fn tail_index(success_count: usize, error_count: usize, margin: f64) -> Result<usize> {
    if success_count == 0 {
        return Err(BenchError::NoSuccessfulTrials);
    }
    // Negative or NaN margins saturate to zero reserved slots.
    let reserved = (error_count as f64 * margin).floor() as usize;
    Ok(success_count.saturating_sub(reserved).min(success_count - 1))
}

/// Mean and sorted tail of a non-empty metric vector.
fn summarize_metric(mut values: Vec<f64>, upper_idx: usize) -> MetricSummary {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.sort_by(f64::total_cmp);
    MetricSummary {
        mean,
        tail: values[upper_idx],
    }
}
