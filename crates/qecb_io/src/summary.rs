//! Parser for simulator summary lines.
//!
//! The simulator prints progress to stdout and finishes with one summary
//! line of whitespace-separated fields. Only three fields are interpreted:
//! index 4 is the logical error count, index 5 the error rate, and index 7
//! the confidence interval. The line itself is kept verbatim for output.

use qecb_core::{BenchError, Result};
use std::str::FromStr;

const ERROR_COUNT_FIELD: usize = 4;
const ERROR_RATE_FIELD: usize = 5;
const CONFIDENCE_INTERVAL_FIELD: usize = 7;

/// Interpreted fields of a simulator summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub error_count: u64,
    pub error_rate: f64,
    pub confidence_interval: f64,
    /// The summary line as printed.
    pub line: String,
}

/// Returns the last non-blank line of the simulator's stdout.
pub fn last_summary_line(stdout: &str) -> Option<&str> {
    stdout
        .trim_matches(|c| c == ' ' || c == '\r' || c == '\n')
        .lines()
        .last()
        .filter(|line| !line.trim().is_empty())
}

/// Parses the fields of one summary line.
///
/// # Errors
///
/// `MalformedSummary` if a required field is missing or does not parse.
pub fn parse_summary_line(line: &str) -> Result<SimulationSummary> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    fn field<T: FromStr>(line: &str, fields: &[&str], idx: usize) -> Result<T> {
        let raw = fields.get(idx).ok_or_else(|| BenchError::MalformedSummary {
            line: line.to_string(),
            reason: format!("expected at least {} fields, found {}", idx + 1, fields.len()),
        })?;
        raw.parse().map_err(|_| BenchError::MalformedSummary {
            line: line.to_string(),
            reason: format!("field {} ({:?}) does not parse", idx, raw),
        })
    }

    Ok(SimulationSummary {
        error_count: field(line, &fields, ERROR_COUNT_FIELD)?,
        error_rate: field(line, &fields, ERROR_RATE_FIELD)?,
        confidence_interval: field(line, &fields, CONFIDENCE_INTERVAL_FIELD)?,
        line: line.to_string(),
    })
}

/// Extracts and parses the summary line from a complete stdout capture.
pub fn parse_simulator_stdout(stdout: &str) -> Result<SimulationSummary> {
    let line = last_summary_line(stdout).ok_or_else(|| BenchError::MalformedSummary {
        line: String::new(),
        reason: "simulator printed nothing".to_string(),
    })?;
    parse_summary_line(line)
}
