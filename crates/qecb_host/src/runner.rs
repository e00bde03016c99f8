//! Simulator process runner for live sweeps.
//!
//! Turns a sweep request into the simulator's argument vector, runs the
//! simulator to completion, and reads the interpreted fields from its final
//! stdout line. The call blocks for as long as the simulator runs; the time
//! budget is passed to the simulator, which is responsible for honouring it.

use qecb_common::model::{SweepPoint, SweepRequest, float_repr};
use qecb_core::sweep::PointEvaluator;
use qecb_core::{BenchError, Result};
use qecb_io::summary::parse_simulator_stdout;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// How to invoke the simulator for every point of a campaign.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Simulator executable.
    pub program: String,
    /// Arguments placed before the per-point arguments, e.g. `tool benchmark`.
    pub prefix_args: Vec<String>,
    pub decoder: String,
    /// Seconds the simulator may spend on one point.
    pub time_budget: f64,
    /// Noise model tag forwarded as `--error_model`.
    pub error_model: String,
    /// Fixed flags following the noise model, `SIMULATOR_FLAGS` by default.
    pub flags: Vec<String>,
    /// Arguments appended verbatim after everything else.
    pub extra_args: Vec<String>,
}

/// `PointEvaluator` backed by a simulator subprocess.
pub struct SimulatorRunner {
    config: SimulatorConfig,
}

impl SimulatorRunner {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Builds the argument vector for one request.
    ///
    /// The code-distance triple is `(di, di, di)`: vertical distance,
    /// horizontal distance, and number of noisy measurement rounds.
    pub fn command_args(&self, request: &SweepRequest) -> Vec<String> {
        let mut args = self.config.prefix_args.clone();
        args.extend([
            format!("[{}]", request.di),
            format!("[{}]", request.di),
            format!("[{}]", float_repr(request.p_pauli)),
            "--djs".to_string(),
            format!("[{}]", request.di),
            "--pes".to_string(),
            format!("[{}]", float_repr(request.p_erasure)),
            "-m".to_string(),
            request.max_n.to_string(),
            "-e".to_string(),
            request.min_error_cases.to_string(),
            "--decoder".to_string(),
            self.config.decoder.clone(),
            "--time_budget".to_string(),
            self.config.time_budget.to_string(),
            "--error_model".to_string(),
            self.config.error_model.clone(),
        ]);
        args.extend(self.config.flags.iter().cloned());
        args.extend(self.config.extra_args.iter().cloned());
        args
    }
}

impl PointEvaluator for SimulatorRunner {
    fn evaluate(&mut self, request: &SweepRequest) -> Result<SweepPoint> {
        let args = self.command_args(request);
        info!(
            index = request.index,
            command = %format!("{} {}", self.config.program, args.join(" ")),
            "running simulator"
        );

        let output = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|err| BenchError::ExternalInvocationFailure {
                status: None,
                detail: format!("failed to start {}: {}", self.config.program, err),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(stdout = %stdout, "simulator output");

        if !output.status.success() {
            return Err(BenchError::ExternalInvocationFailure {
                status: output.status.code(),
                detail: format!("{} exited with {}", self.config.program, output.status),
            });
        }

        let summary = parse_simulator_stdout(&stdout)?;
        Ok(SweepPoint {
            p_ratio: request.p_ratio,
            p: request.p,
            error_count: summary.error_count,
            error_rate: summary.error_rate,
            confidence_interval: summary.confidence_interval,
            raw: summary.line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qecb_common::campaign::SIMULATOR_FLAGS;

    fn request() -> SweepRequest {
        SweepRequest {
            index: 3,
            di: 5,
            p: 0.02,
            p_ratio: 0.512,
            p_pauli: 0.001,
            p_erasure: 0.019,
            min_error_cases: 6000,
            max_n: 100_000_000,
        }
    }

    fn config(program: &str, prefix_args: &[&str]) -> SimulatorConfig {
        SimulatorConfig {
            program: program.to_string(),
            prefix_args: prefix_args.iter().map(|s| s.to_string()).collect(),
            decoder: "UF".to_string(),
            time_budget: 3600.0,
            error_model: "OnlyGateErrorCircuitLevel".to_string(),
            flags: SIMULATOR_FLAGS.iter().map(|s| s.to_string()).collect(),
            extra_args: vec!["--debug_print".to_string()],
        }
    }

    #[test]
    fn builds_benchmark_arguments() {
        let runner = SimulatorRunner::new(config("qecp", &["tool", "benchmark"]));
        let args = runner.command_args(&request());
        assert_eq!(
            args.join(" "),
            "tool benchmark [5] [5] [0.001] --djs [5] --pes [0.019] -m 100000000 -e 6000 \
             --decoder UF --time_budget 3600 --error_model OnlyGateErrorCircuitLevel \
             -p0 --max_half_weight 100 --use_xzzx_code --debug_print"
        );
    }

    #[test]
    fn small_probabilities_use_padded_exponents() {
        let runner = SimulatorRunner::new(config("qecp", &[]));
        let mut request = request();
        request.p_pauli = 0.0;
        request.p_erasure = 3.7138201178561524e-5;
        let args = runner.command_args(&request);
        assert_eq!(args[2], "[0.0]");
        assert_eq!(args[6], "[3.7138201178561524e-05]");
    }

    #[cfg(unix)]
    #[test]
    fn reads_summary_from_process() {
        // `sh -c` ignores the appended per-point arguments.
        let mut runner = SimulatorRunner::new(config(
            "sh",
            &["-c", "echo 'format: <p> <di>'; echo '0.001 5 5 5 700 0.07 10000 0.005'", "sim"],
        ));
        let point = runner.evaluate(&request()).unwrap();
        assert_eq!(point.error_count, 700);
        assert_eq!(point.error_rate, 0.07);
        assert_eq!(point.confidence_interval, 0.005);
        assert_eq!(point.p_ratio, 0.512);
        assert_eq!(point.raw, "0.001 5 5 5 700 0.07 10000 0.005");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_invocation_failure() {
        let mut runner = SimulatorRunner::new(config("sh", &["-c", "echo partial; exit 3", "sim"]));
        let err = runner.evaluate(&request()).unwrap_err();
        assert!(matches!(
            err,
            BenchError::ExternalInvocationFailure { status: Some(3), .. }
        ));
    }

    #[test]
    fn missing_program_is_invocation_failure() {
        let mut runner = SimulatorRunner::new(config("qecb-no-such-simulator", &[]));
        let err = runner.evaluate(&request()).unwrap_err();
        assert!(matches!(
            err,
            BenchError::ExternalInvocationFailure { status: None, .. }
        ));
    }
}
