//! I/O utilities for benchmarking campaign data files.
//!
//! Provides functions for reading offline trial logs, per-ratio threshold
//! tables, and simulator summary lines, and for persisting sweep results.
//! These utilities handle the text formats and convert them to the shared
//! data model; all failures surface as `qecb_core::BenchError`.

/// Loader for the per-Pauli-ratio threshold table.
///
/// Reads `<pauli_ratio> <threshold> <deviation>` rows and keeps only the
/// ratios a campaign sweeps over.
pub mod loader;

/// Parser for offline trial logs.
///
/// Splits a line-oriented log into configuration headers and the trial
/// records that follow each header, plus the optional shared fixed
/// configuration.
pub mod parser;

/// Parser for the final summary line printed by the simulator.
pub mod summary;

/// Atomic persistence of sweep output files.
pub mod writer;
