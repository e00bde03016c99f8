//! Common definitions and constants shared across the benchmarking toolkit.
//!
//! This crate provides the data model that connects the live sweep pipeline
//! and the offline analysis pipeline: decoder configurations, trial records,
//! sweep points, fitting data, and the campaign constants both pipelines
//! agree on. It carries no behavior beyond small accessors.

// Constants governing a live threshold sweep campaign.
//
// These values define the probability ladder, the per-point trial budget
// handed to the simulator, and the early-stopping rule. They mirror the
// defaults exposed on the command line of the host binary.
pub mod campaign {
    /// Geometric ratio between consecutive probabilities on the ladder.
    ///
    /// Each candidate is `threshold * DECAY^i`, so the ladder descends from
    /// the threshold towards ever smaller physical error rates.
    pub const DECAY: f64 = 0.8;

    /// Number of candidate probabilities generated for one sweep.
    pub const MAX_POINTS: usize = 200;

    /// Minimum number of logical errors the simulator collects per point.
    ///
    /// Forwarded to the simulator, which keeps sampling until it has seen
    /// this many failures or exhausted `MAX_N` trials.
    pub const MIN_ERROR_CASES: u64 = 6000;

    /// Upper bound on the number of trials the simulator runs per point.
    pub const MAX_N: u64 = 100_000_000;

    /// Fraction of `MIN_ERROR_CASES` below which a sweep stops early.
    ///
    /// Once a point reports fewer errors than this fraction, its confidence
    /// and that of every smaller probability are considered untrustworthy.
    pub const EARLY_STOP_FRACTION: f64 = 0.1;

    /// Code distance used when none is given.
    pub const CODE_DISTANCE: u32 = 5;

    /// Wall-clock budget in seconds the simulator enforces per point.
    pub const TIME_BUDGET_SECS: f64 = 3600.0;

    /// Simulator flags passed on every point unless overridden.
    ///
    /// `-p0` lets the simulator use every core; the weight cap and the XZZX
    /// code variant match the published benchmark setup.
    pub const SIMULATOR_FLAGS: [&str; 4] = ["-p0", "--max_half_weight", "100", "--use_xzzx_code"];

    /// Pauli ratios consumed from the threshold table.
    ///
    /// Rows are matched on their literal ratio token, so `0.10` in a table
    /// does not select the `0.1` sweep.
    pub const ALLOWED_PAULI_RATIOS: [&str; 5] = ["0", "0.01", "0.05", "0.1", "1"];
}

// Constants for the offline statistics and fitting pipeline.
pub mod analysis {
    /// Fraction of failed trials folded back in as slow successes.
    ///
    /// Shifts the tail index down by `floor(error_count * TAIL_MARGIN)`,
    /// which corresponds to roughly 110% of the observed error rate.
    pub const TAIL_MARGIN: f64 = 0.1;

    /// Smallest code distance admitted into the scaling fit.
    ///
    /// Small codes are dominated by constant overheads and distort the
    /// asymptotic slope.
    pub const MIN_FIT_DISTANCE: u32 = 4;
}

/// Data model shared by both pipelines.
pub mod model {
    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Value};

    /// Decoder parameter set declared by a `# ` header in a trial log.
    ///
    /// Only the code distance is typed; every other key is kept verbatim
    /// so configurations survive schema drift in the simulator output.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Configuration {
        /// Code distance along the vertical axis, if the header carries one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub di: Option<u32>,

        /// Remaining header keys in their original form.
        #[serde(flatten)]
        pub parameters: Map<String, Value>,
    }

    impl Configuration {
        /// Returns the decoder kind when the header names one as a string.
        pub fn decoder(&self) -> Option<&str> {
            self.parameters.get("decoder").and_then(Value::as_str)
        }
    }

    /// Outcome of a single simulated decoding trial.
    ///
    /// Timings of failed trials are reported as zero by the simulator and
    /// carry no information; missing timings decode as zero.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct TrialRecord {
        pub error: bool,
        #[serde(default)]
        pub time_build_decoders: f64,
        #[serde(default)]
        pub time_run_to_stable: f64,
    }

    impl TrialRecord {
        /// Reads one timing metric from the record.
        pub fn metric(&self, metric: Metric) -> f64 {
            match metric {
                Metric::BuildDecoders => self.time_build_decoders,
                Metric::RunToStable => self.time_run_to_stable,
                Metric::BuildDecodersRunToStable => {
                    self.time_build_decoders + self.time_run_to_stable
                }
            }
        }
    }

    /// Timing metrics tracked per configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Metric {
        BuildDecoders,
        RunToStable,
        BuildDecodersRunToStable,
    }

    impl Metric {
        pub const ALL: [Metric; 3] = [
            Metric::BuildDecoders,
            Metric::RunToStable,
            Metric::BuildDecodersRunToStable,
        ];

        /// Field name used in reports.
        pub fn label(self) -> &'static str {
            match self {
                Metric::BuildDecoders => "time_build_decoders",
                Metric::RunToStable => "time_run_to_stable",
                Metric::BuildDecodersRunToStable => "time_build_decoders_run_to_stable",
            }
        }
    }

    /// One candidate on a sweep ladder, as handed to the simulator.
    #[derive(Debug, Clone, PartialEq)]
    pub struct SweepRequest {
        /// Position on the ladder, starting at zero for the threshold itself.
        pub index: usize,
        pub di: u32,
        /// Total physical error probability.
        pub p: f64,
        /// `p / threshold`.
        pub p_ratio: f64,
        pub p_pauli: f64,
        pub p_erasure: f64,
        pub min_error_cases: u64,
        pub max_n: u64,
    }

    /// Result of evaluating one sweep point.
    #[derive(Debug, Clone, PartialEq)]
    pub struct SweepPoint {
        /// `p / threshold`.
        pub p_ratio: f64,
        pub p: f64,
        pub error_count: u64,
        pub error_rate: f64,
        /// Passed through from the simulator unmodified.
        pub confidence_interval: f64,
        /// Summary line exactly as the simulator printed it.
        pub raw: String,
    }

    impl SweepPoint {
        /// Formats the point as one line of a sweep output file.
        pub fn to_line(&self) -> String {
            format!("{} {} {}", float_repr(self.p_ratio), float_repr(self.p), self.raw)
        }
    }

    /// Shortest round-trip form of `value` as written to sweep outputs.
    ///
    /// Plain notation keeps a fractional part (`1.0`, `0.0001`). Values below
    /// `1e-4` or from `1e16` up use scientific notation with a signed exponent
    /// of at least two digits (`3.7e-05`, `1e+16`).
    pub fn float_repr(value: f64) -> String {
        if value.is_nan() {
            return "nan".to_string();
        }
        let debug = format!("{:?}", value);
        match debug.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => debug,
        }
    }

    /// `(code distance, mean stabilization time)` input to the scaling fit.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct FittingDatum {
        pub di: u32,
        pub mean_time: f64,
    }

}
