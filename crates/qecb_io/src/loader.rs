use nom::IResult;
use nom::character::complete::{space0, space1};
use nom::combinator::eof;
use nom::number::complete::{double, recognize_float};
use qecb_common::campaign::ALLOWED_PAULI_RATIOS;
use qecb_core::{BenchError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Reference threshold measured for one Pauli ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdEntry {
    pub pauli_ratio: f64,
    pub threshold: f64,
    pub deviation: f64,
}

/// `<ratio> <threshold> <deviation>`, keeping the ratio's literal token.
fn threshold_row(input: &str) -> IResult<&str, (&str, f64, f64)> {
    let (input, ratio) = recognize_float(input)?;
    let (input, _) = space1(input)?;
    let (input, threshold) = double(input)?;
    let (input, _) = space1(input)?;
    let (input, deviation) = double(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = eof(input)?;
    Ok((input, (ratio, threshold, deviation)))
}

/// Parses a threshold table, keeping rows whose ratio is swept.
///
/// Rows are filtered on the literal ratio token against
/// `ALLOWED_PAULI_RATIOS`; table order is preserved.
pub fn parse_threshold_table<R: BufRead>(reader: R) -> Result<Vec<ThresholdEntry>> {
    let mut entries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim_matches(|c| c == ' ' || c == '\r' || c == '\n');
        if trimmed.is_empty() {
            continue;
        }

        let malformed = || BenchError::MalformedThresholdRow {
            line: idx + 1,
            content: trimmed.to_string(),
        };
        let (_, (ratio, threshold, deviation)) = threshold_row(trimmed).map_err(|_| malformed())?;

        if !ALLOWED_PAULI_RATIOS.contains(&ratio) {
            debug!(ratio, "pauli ratio not in the swept subset, skipped");
            continue;
        }

        entries.push(ThresholdEntry {
            pauli_ratio: ratio.parse().map_err(|_| malformed())?,
            threshold,
            deviation,
        });
    }

    Ok(entries)
}

/// Loads the threshold table at `path`.
pub fn load_threshold_table<P: AsRef<Path>>(path: P) -> Result<Vec<ThresholdEntry>> {
    let file = File::open(path)?;
    parse_threshold_table(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_swept_ratios() {
        let table = "0 0.0411 0.0003\n0.02 0.03 0.001\n0.01 0.0375 0.0002\n\n0.1 0.0210 0.0001\n0.5 0.01 0.0\n1 0.0068 0.00005\n";
        let entries = parse_threshold_table(table.as_bytes()).unwrap();
        let ratios: Vec<f64> = entries.iter().map(|e| e.pauli_ratio).collect();
        assert_eq!(ratios, vec![0.0, 0.01, 0.1, 1.0]);
        assert_eq!(entries[0].threshold, 0.0411);
        assert_eq!(entries[3].deviation, 0.00005);
    }

    #[test]
    fn ratio_matches_literal_token() {
        let entries = parse_threshold_table("0.10 0.02 0.001\n1.0 0.007 0.0\n".as_bytes()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn accepts_tabs_and_carriage_returns() {
        let entries = parse_threshold_table("0.05\t0.03 0.002\r\n".as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pauli_ratio, 0.05);
    }

    #[test]
    fn short_row_is_malformed() {
        let err = parse_threshold_table("0 0.04\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BenchError::MalformedThresholdRow { line: 1, .. }));

        let err = parse_threshold_table("0 0.04 0.001 extra\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BenchError::MalformedThresholdRow { line: 1, .. }));
    }
}
