//! Power-law scaling fit of decoding time against code distance.
//!
//! Fits `ln(time) = slope * ln(di) + intercept` by ordinary least squares,
//! so `slope` is the exponent `k` in `time ~ C * di^k`.

use crate::aggregate::AggregateStats;
use crate::{BenchError, Result};
use qecb_common::model::{Configuration, FittingDatum};
use tracing::debug;

/// Result of a log-log linear regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawFit {
    pub slope: f64,
    pub intercept: f64,
    /// Squared Pearson correlation of the transformed points.
    pub r_square: f64,
    pub points: usize,
}

/// Collects fitting data from aggregated configurations.
///
/// Keeps configurations whose code distance is at least `min_distance`.
/// Configurations without a distance or without successful trials carry
/// no mean runtime and are skipped.
pub fn fitting_data<'a, I>(aggregates: I, min_distance: u32) -> Vec<FittingDatum>
where
    I: IntoIterator<Item = (&'a Configuration, &'a AggregateStats)>,
{
    aggregates
        .into_iter()
        .filter_map(|(config, stats)| {
            let di = config.di?;
            if di < min_distance {
                return None;
            }
            let Some(timings) = stats.timings else {
                debug!(di, "configuration has no successful trials, not fitted");
                return None;
            };
            Some(FittingDatum {
                di,
                mean_time: timings.run_to_stable.mean,
            })
        })
        .collect()
}

/// Fits mean runtime against code distance on log-log axes.
///
/// # Errors
///
/// `InvalidValue` if a distance is zero or a mean time is not a positive
/// finite number; `InsufficientData` with fewer than two points or when
/// every point shares one distance.
pub fn fit_power_law(data: &[FittingDatum]) -> Result<PowerLawFit> {
    if let Some(bad) = data
        .iter()
        .find(|d| !(d.mean_time > 0.0 && d.mean_time.is_finite()))
    {
        return Err(BenchError::InvalidValue(format!(
            "mean time {} at di={} is not positive",
            bad.mean_time, bad.di
        )));
    }
    if let Some(bad) = data.iter().find(|d| d.di == 0) {
        return Err(BenchError::InvalidValue(format!(
            "code distance {} cannot be log-transformed",
            bad.di
        )));
    }
    if data.len() < 2 {
        return Err(BenchError::InsufficientData(format!(
            "{} point(s), need at least 2",
            data.len()
        )));
    }

    let xs: Vec<f64> = data.iter().map(|d| f64::from(d.di).ln()).collect();
    let ys: Vec<f64> = data.iter().map(|d| d.mean_time.ln()).collect();
    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 {
        return Err(BenchError::InsufficientData(
            "all points share one code distance".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let r_square = if syy == 0.0 {
        0.0
    } else {
        let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
        r * r
    };

    Ok(PowerLawFit {
        slope,
        intercept,
        r_square,
        points: data.len(),
    })
}
