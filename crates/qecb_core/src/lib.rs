//! Core algorithms for decoder benchmarking campaigns.
//!
//! This crate provides the statistics aggregator, the log-log scaling
//! fitter, and the adaptive sweep controller. It performs no I/O of its own:
//! trial data arrives as parsed records and the simulator is reached through
//! the `PointEvaluator` capability, so every algorithm can be exercised
//! deterministically.

use thiserror::Error;

/// Per-configuration timing statistics with a safety-margined tail.
///
/// Partitions trials into failures and successes, computes the error rate,
/// and summarises the build, stabilization, and combined timings of the
/// successful trials as a mean and a tail quantile.
pub mod aggregate;

/// Log-log least-squares fit of runtime against code distance.
///
/// Recovers the scaling exponent of the decoder's mean runtime from
/// per-configuration means.
pub mod fit;

/// Adaptive sweep over a descending ladder of physical error rates.
///
/// Drives one simulator evaluation per ladder point and stops early once
/// the collected error statistics are no longer trustworthy.
pub mod sweep;

/// Result type used throughout the library crates.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Error types returned by ingestion, aggregation, fitting, and sweeps.
///
/// Every variant is scoped to one unit of work: a single ingestion pass,
/// configuration, fit, or sweep. Callers decide whether sibling units keep
/// going.
#[derive(Error, Debug)]
pub enum BenchError {
    /// A trial log line could not be turned into a header or record.
    ///
    /// Raised for a record that precedes every `# ` header and for any
    /// line whose JSON payload does not decode.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A threshold table row is not three whitespace-separated numbers.
    #[error("malformed threshold row at line {line}: {content:?}")]
    MalformedThresholdRow { line: usize, content: String },

    /// The simulator could not be run or exited unsuccessfully.
    ///
    /// `status` is `None` when the process was killed by a signal or never
    /// started.
    #[error("simulator invocation failed (status {status:?}): {detail}")]
    ExternalInvocationFailure { status: Option<i32>, detail: String },

    /// The simulator's final stdout line lacks the expected fields.
    #[error("malformed simulator summary {line:?}: {reason}")]
    MalformedSummary { line: String, reason: String },

    /// A configuration has no trial records to compute a rate from.
    #[error("division by zero: configuration has no trial records")]
    DivisionByZero,

    /// A tail quantile was requested over an empty set of successes.
    #[error("no successful trials to compute timing statistics from")]
    NoSuccessfulTrials,

    /// The scaling fit needs at least two distinct code distances.
    #[error("insufficient data for fit: {0}")]
    InsufficientData(String),

    /// A numeric input is outside the domain an algorithm accepts.
    ///
    /// Raised for fitting inputs that cannot be log-transformed and for
    /// sweep parameters that would not produce a descending ladder.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
