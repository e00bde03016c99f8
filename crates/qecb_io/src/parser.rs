//! Parser for offline trial logs.
//!
//! A trial log is UTF-8 and line oriented. Blank lines are ignored, a
//! `#f <json>` line sets the shared fixed configuration (the last one wins),
//! a `# <json>` line opens a new configuration, and every other line is a
//! JSON trial record owned by the most recently opened configuration.

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::{map, rest};
use nom::sequence::preceded;
use qecb_common::model::{Configuration, TrialRecord};
use qecb_core::{BenchError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Trial records collected under one configuration header.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationGroup {
    pub configuration: Configuration,
    pub records: Vec<TrialRecord>,
}

/// Parsed contents of a trial log, in ingestion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialLog {
    /// Shared context from the last `#f` line.
    ///
    /// Kept apart from the groups; it never feeds the statistics.
    pub fixed_configuration: Option<Value>,
    pub groups: Vec<ConfigurationGroup>,
}

impl TrialLog {
    /// Total number of trial records across all configurations.
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|group| group.records.len()).sum()
    }
}

/// Classification of one log line.
#[derive(Debug, PartialEq)]
enum LogLine<'a> {
    Blank,
    Fixed(&'a str),
    Header(&'a str),
    Record(&'a str),
}

fn classify(line: &str) -> LogLine<'_> {
    let line = line.trim_matches(|c| c == ' ' || c == '\r' || c == '\n');
    if line.is_empty() {
        return LogLine::Blank;
    }

    let directive: IResult<&str, LogLine<'_>> = alt((
        map(preceded(tag("#f "), rest), LogLine::Fixed),
        map(preceded(tag("# "), rest), LogLine::Header),
    ))(line);

    match directive {
        Ok((_, kind)) => kind,
        Err(_) => LogLine::Record(line),
    }
}

fn decode<T: DeserializeOwned>(line: usize, json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|err| BenchError::MalformedRecord {
        line,
        reason: err.to_string(),
    })
}

/// Folds one line into the log.
///
/// `current` is the index of the open configuration group, if any.
fn ingest_line(
    (mut log, current): (TrialLog, Option<usize>),
    line_no: usize,
    line: &str,
) -> Result<(TrialLog, Option<usize>)> {
    match classify(line) {
        LogLine::Blank => Ok((log, current)),
        LogLine::Fixed(json) => {
            log.fixed_configuration = Some(decode(line_no, json)?);
            Ok((log, current))
        }
        LogLine::Header(json) => {
            let configuration: Configuration = decode(line_no, json)?;
            log.groups.push(ConfigurationGroup {
                configuration,
                records: Vec::new(),
            });
            let opened = log.groups.len() - 1;
            Ok((log, Some(opened)))
        }
        LogLine::Record(json) => {
            let Some(idx) = current else {
                return Err(BenchError::MalformedRecord {
                    line: line_no,
                    reason: "trial record precedes every configuration header".to_string(),
                });
            };
            let record: TrialRecord = decode(line_no, json)?;
            log.groups[idx].records.push(record);
            Ok((log, current))
        }
    }
}

/// Parses a trial log from any buffered reader.
///
/// # Errors
///
/// `MalformedRecord` with the 1-based line number for a record before the
/// first header or for undecodable JSON; `Io` when reading fails. No
/// partial log is returned.
pub fn parse_trial_log<R: BufRead>(reader: R) -> Result<TrialLog> {
    let (log, _) = reader
        .lines()
        .enumerate()
        .try_fold((TrialLog::default(), None), |state, (idx, line)| {
            ingest_line(state, idx + 1, &line?)
        })?;

    debug!(
        configurations = log.groups.len(),
        records = log.record_count(),
        "trial log parsed"
    );
    Ok(log)
}

/// Loads and parses a trial log file.
pub fn load_trial_log<P: AsRef<Path>>(path: P) -> Result<TrialLog> {
    let file = File::open(path)?;
    parse_trial_log(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_directives() {
        assert_eq!(classify("  \r"), LogLine::Blank);
        assert_eq!(classify("#f {\"a\":1}"), LogLine::Fixed("{\"a\":1}"));
        assert_eq!(classify("# {\"di\":3}\r"), LogLine::Header("{\"di\":3}"));
        assert_eq!(classify("{\"error\":true}"), LogLine::Record("{\"error\":true}"));
        assert_eq!(classify("#{}"), LogLine::Record("#{}"));
    }

    #[test]
    fn groups_records_under_latest_header() {
        let input = r#"#f {"code":"xzzx"}

# {"di":5}
{"error":false,"time_build_decoders":1.0,"time_run_to_stable":2.0}
{"error":true,"time_build_decoders":0,"time_run_to_stable":0}
# {"di":7,"decoder":"UF"}
{"error":false,"time_build_decoders":3.0,"time_run_to_stable":4.0}
"#;
        let log = parse_trial_log(input.as_bytes()).unwrap();
        assert_eq!(log.fixed_configuration, Some(serde_json::json!({"code": "xzzx"})));
        assert_eq!(log.groups.len(), 2);
        assert_eq!(log.groups[0].configuration.di, Some(5));
        assert_eq!(log.groups[0].records.len(), 2);
        assert!(log.groups[0].records[1].error);
        assert_eq!(log.groups[1].configuration.decoder(), Some("UF"));
        assert_eq!(log.groups[1].records.len(), 1);
        assert_eq!(log.record_count(), 3);
    }

    #[test]
    fn last_fixed_configuration_wins() {
        let input = "#f {\"v\":1}\n# {\"di\":3}\n#f {\"v\":2}\n";
        let log = parse_trial_log(input.as_bytes()).unwrap();
        assert_eq!(log.fixed_configuration, Some(serde_json::json!({"v": 2})));
        assert!(log.groups[0].configuration.parameters.get("v").is_none());
    }

    #[test]
    fn record_before_header_is_malformed() {
        let input = "\n{\"error\":false,\"time_build_decoders\":1,\"time_run_to_stable\":1}\n";
        let err = parse_trial_log(input.as_bytes()).unwrap_err();
        assert!(matches!(err, BenchError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let input = "# {\"di\":3}\n{\"error\":fals}\n";
        let err = parse_trial_log(input.as_bytes()).unwrap_err();
        assert!(matches!(err, BenchError::MalformedRecord { line: 2, .. }));

        let err = parse_trial_log("# not json\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BenchError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn failed_record_may_omit_timings() {
        let input = "# {\"di\":3}\n{\"error\":true}\n{\"error\":false,\"time_build_decoders\":1.5,\"time_run_to_stable\":2.5}\n";
        let log = parse_trial_log(input.as_bytes()).unwrap();
        let records = &log.groups[0].records;
        assert_eq!(records.len(), 2);
        assert!(records[0].error);
        assert_eq!(records[0].time_build_decoders, 0.0);
        assert_eq!(records[1].time_run_to_stable, 2.5);
    }

    #[test]
    fn header_keeps_unknown_parameters() {
        let log = parse_trial_log("# {\"di\":9,\"max_half_weight\":100}\n".as_bytes()).unwrap();
        let config = &log.groups[0].configuration;
        assert_eq!(config.di, Some(9));
        assert_eq!(config.parameters["max_half_weight"], 100);
        assert!(log.groups[0].records.is_empty());
    }
}
