mod analyze;
mod campaign;
mod runner;
mod stats;

use anyhow::Result;
use clap::{Parser, Subcommand};
use qecb_common::analysis::{MIN_FIT_DISTANCE, TAIL_MARGIN};
use qecb_common::campaign::{
    CODE_DISTANCE, DECAY, MAX_N, MAX_POINTS, MIN_ERROR_CASES, SIMULATOR_FLAGS, TIME_BUDGET_SECS,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Benchmarking campaigns for a quantum error-correction decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep every selected Pauli ratio of a threshold table
    Sweep {
        #[arg(short, long, default_value = "thresholds.txt")]
        thresholds: String,
        #[arg(short, long)]
        simulator: String,
        /// Simulator arguments placed before the per-point arguments
        #[arg(long = "simulator-arg", allow_hyphen_values = true, default_values_t = [String::from("tool"), String::from("benchmark")])]
        simulator_args: Vec<String>,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = CODE_DISTANCE)]
        di: u32,
        #[arg(long, default_value_t = MIN_ERROR_CASES)]
        min_error_cases: u64,
        #[arg(long, default_value_t = MAX_N)]
        max_n: u64,
        #[arg(long, default_value_t = MAX_POINTS)]
        max_points: usize,
        #[arg(long, default_value_t = DECAY)]
        decay: f64,
        #[arg(long, default_value = "UF")]
        decoder: String,
        #[arg(long, default_value_t = TIME_BUDGET_SECS)]
        time_budget: f64,
        #[arg(long, default_value = "OnlyGateErrorCircuitLevel")]
        error_model: String,
        /// Fixed simulator flags following the noise model
        #[arg(long = "simulator-flag", allow_hyphen_values = true, default_values = SIMULATOR_FLAGS)]
        simulator_flags: Vec<String>,
        /// Extra simulator arguments, given after `--`
        #[arg(last = true)]
        extra: Vec<String>,
    },
    /// Aggregate a trial log and fit runtime scaling
    Analyze {
        #[arg(short, long, default_value = "decoding_time_UF.txt")]
        log: String,
        #[arg(long, default_value_t = TAIL_MARGIN)]
        tail_margin: f64,
        #[arg(long, default_value_t = MIN_FIT_DISTANCE)]
        min_fit_distance: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sweep {
            thresholds,
            simulator,
            simulator_args,
            out_dir,
            di,
            min_error_cases,
            max_n,
            max_points,
            decay,
            decoder,
            time_budget,
            error_model,
            simulator_flags,
            extra,
        } => {
            let mut runner = runner::SimulatorRunner::new(runner::SimulatorConfig {
                program: simulator,
                prefix_args: simulator_args,
                decoder,
                time_budget,
                error_model,
                flags: simulator_flags,
                extra_args: extra,
            });
            let config = campaign::CampaignConfig {
                out_dir,
                di,
                decay,
                max_points,
                min_error_cases,
                max_n,
            };
            campaign::run_sweeps(Path::new(&thresholds), &config, &mut runner)?;
        }
        Commands::Analyze {
            log,
            tail_margin,
            min_fit_distance,
        } => {
            analyze::run_analysis(
                &log,
                analyze::AnalysisConfig {
                    tail_margin,
                    min_fit_distance,
                },
            )?;
        }
    }
    Ok(())
}
