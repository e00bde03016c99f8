//! Adaptive threshold sweep with early termination.
//!
//! A sweep walks a geometric ladder of total physical error probabilities
//! downward from a reference threshold. Each point is evaluated by an
//! external simulator through the `PointEvaluator` capability. The sweep
//! ends when the ladder is exhausted, when a point collects too few logical
//! errors to be trusted (every smaller probability would collect fewer
//! still), or when the simulator fails.
//!
//! Evaluation is strictly sequential and blocking. The controller enforces
//! no timeout; the simulator is expected to honour its own time budget.

use crate::{BenchError, Result};
use qecb_common::campaign::{
    CODE_DISTANCE, DECAY, EARLY_STOP_FRACTION, MAX_N, MAX_POINTS, MIN_ERROR_CASES,
};
use qecb_common::model::{SweepPoint, SweepRequest};
use tracing::{debug, info};

/// Evaluates one sweep point, typically by running the simulator.
///
/// Any error is fatal to the sweep that issued the request.
pub trait PointEvaluator {
    fn evaluate(&mut self, request: &SweepRequest) -> Result<SweepPoint>;
}

impl<F> PointEvaluator for F
where
    F: FnMut(&SweepRequest) -> Result<SweepPoint>,
{
    fn evaluate(&mut self, request: &SweepRequest) -> Result<SweepPoint> {
        self(request)
    }
}

/// Parameters of one sweep at a fixed Pauli ratio and code distance.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepParams {
    /// Share of `p` assigned to the Pauli channel; the rest is erasure.
    pub pauli_ratio: f64,
    /// Reference probability the ladder starts from.
    pub threshold: f64,
    pub di: u32,
    pub decay: f64,
    pub max_points: usize,
    pub min_error_cases: u64,
    pub max_n: u64,
}

impl SweepParams {
    /// Builds parameters with the campaign defaults.
    pub fn new(pauli_ratio: f64, threshold: f64) -> Self {
        Self {
            pauli_ratio,
            threshold,
            di: CODE_DISTANCE,
            decay: DECAY,
            max_points: MAX_POINTS,
            min_error_cases: MIN_ERROR_CASES,
            max_n: MAX_N,
        }
    }

    /// Error count below which the sweep stops after a point.
    pub fn early_stop_below(&self) -> f64 {
        self.min_error_cases as f64 * EARLY_STOP_FRACTION
    }

    fn request(&self, index: usize, p: f64) -> SweepRequest {
        SweepRequest {
            index,
            di: self.di,
            p,
            p_ratio: p / self.threshold,
            p_pauli: p * self.pauli_ratio,
            p_erasure: p * (1.0 - self.pauli_ratio),
            min_error_cases: self.min_error_cases,
            max_n: self.max_n,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold.is_finite()) {
            return Err(BenchError::InvalidValue(format!(
                "threshold {} must be positive",
                self.threshold
            )));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(BenchError::InvalidValue(format!(
                "decay {} must lie strictly between 0 and 1",
                self.decay
            )));
        }
        if !(0.0..=1.0).contains(&self.pauli_ratio) {
            return Err(BenchError::InvalidValue(format!(
                "pauli ratio {} must lie in [0, 1]",
                self.pauli_ratio
            )));
        }
        if let Some(last) = self.max_points.checked_sub(1) {
            let exponent = i32::try_from(last).map_err(|_| {
                BenchError::InvalidValue(format!("max points {} is too large", self.max_points))
            })?;
            // The smallest candidate must stay a normal float or the tail of
            // the ladder collapses onto zero.
            let smallest = self.threshold * self.decay.powi(exponent);
            if !smallest.is_normal() {
                return Err(BenchError::InvalidValue(format!(
                    "ladder of {} points from {} with decay {} underflows to {}",
                    self.max_points, self.threshold, self.decay, smallest
                )));
            }
        }
        Ok(())
    }
}

/// Generates `threshold * decay^i` for `i` in `0..max_points`.
///
/// Exponents stop at `i32::MAX`; `SweepController::run` rejects longer
/// ladders before generating one.
pub fn probability_ladder(threshold: f64, decay: f64, max_points: usize) -> Vec<f64> {
    (0..=i32::MAX)
        .take(max_points)
        .map(|i| threshold * decay.powi(i))
        .collect()
}

/// Why a sweep stopped evaluating points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every ladder point was evaluated.
    Exhausted,
    /// The point at `index` reported too few errors.
    EarlyStop { index: usize },
}

/// Points evaluated by one completed sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub pauli_ratio: f64,
    pub points: Vec<SweepPoint>,
    pub stop: StopReason,
}

impl SweepOutcome {
    /// One output line per evaluated point, in ladder order.
    pub fn lines(&self) -> Vec<String> {
        self.points.iter().map(SweepPoint::to_line).collect()
    }

    /// Newline-joined lines with a trailing newline, as persisted.
    pub fn render(&self) -> String {
        let mut out = self.lines().join("\n");
        out.push('\n');
        out
    }
}

/// Runs one sweep against an evaluator.
pub struct SweepController {
    params: SweepParams,
}

impl SweepController {
    pub fn new(params: SweepParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SweepParams {
        &self.params
    }

    /// Evaluates ladder points in descending order until a stop condition.
    ///
    /// The outcome is only returned once the sweep has ended, so callers
    /// persist it in a single write.
    ///
    /// # Errors
    ///
    /// Propagates the first evaluator error unchanged, discarding points
    /// gathered so far. Returns `InvalidValue` for parameters that cannot
    /// produce a strictly descending ladder.
    pub fn run<E: PointEvaluator + ?Sized>(&self, evaluator: &mut E) -> Result<SweepOutcome> {
        let params = &self.params;
        params.validate()?;

        let ladder = probability_ladder(params.threshold, params.decay, params.max_points);
        let stop_below = params.early_stop_below();
        let mut points = Vec::with_capacity(ladder.len());

        info!(
            pauli_ratio = params.pauli_ratio,
            threshold = params.threshold,
            di = params.di,
            candidates = ladder.len(),
            "starting sweep"
        );

        for (index, p) in ladder.into_iter().enumerate() {
            let request = params.request(index, p);
            debug!(?request, "evaluating sweep point");

            let point = evaluator.evaluate(&request)?;
            let error_count = point.error_count;
            info!(
                index,
                p,
                error_count,
                error_rate = point.error_rate,
                confidence_interval = point.confidence_interval,
                "sweep point done"
            );
            points.push(point);

            if (error_count as f64) < stop_below {
                info!(index, error_count, stop_below, "too few errors, stopping sweep early");
                return Ok(SweepOutcome {
                    pauli_ratio: params.pauli_ratio,
                    points,
                    stop: StopReason::EarlyStop { index },
                });
            }
        }

        Ok(SweepOutcome {
            pauli_ratio: params.pauli_ratio,
            points,
            stop: StopReason::Exhausted,
        })
    }
}
