//! Report printing for aggregated decoding-time statistics.
//!
//! Formats per-configuration counts, error rates, and timing summaries,
//! followed by the scaling fit, in the plain line-per-value layout used by
//! the analysis command.

use crate::analyze::{Analysis, ConfigurationReport};
use qecb_common::model::Metric;
use qecb_core::fit::PowerLawFit;

/// Prints one configuration's statistics.
///
/// Each timing metric is shown as `<mean>, <tail>`. A configuration without
/// successful trials shows its counts only.
pub fn print_configuration(report: &ConfigurationReport) {
    println!("\nConfiguration {}", report.header());

    let stats = match &report.stats {
        Ok(stats) => stats,
        Err(err) => {
            println!("Skipped: {}", err);
            return;
        }
    };

    println!(
        "error: {}, success_count: {}, error_rate: {}",
        stats.error_count, stats.success_count, stats.error_rate
    );

    match (&stats.timings, stats.upper_idx) {
        (Some(timings), Some(upper_idx)) => {
            println!("Tail index: {}", upper_idx);
            for metric in Metric::ALL {
                let summary = timings.get(metric);
                println!("{}: {}, {}", metric.label(), summary.mean, summary.tail);
            }
        }
        _ => println!("No successful trials, timing statistics omitted"),
    }
}

/// Prints the power-law fit of mean stabilization time.
pub fn print_fit(fit: &PowerLawFit) {
    println!("slope = {}", fit.slope);
    println!("intercept = {}", fit.intercept);
    println!("r_square = {}", fit.r_square);
}

/// Prints the full analysis report.
pub fn print_report(analysis: &Analysis) {
    match &analysis.fixed_configuration {
        Some(fixed) => println!("Fixed configuration: {}", fixed),
        None => println!("Fixed configuration: none"),
    }

    for report in &analysis.configurations {
        print_configuration(report);
    }

    println!("\nScaling Fit (time_run_to_stable vs di)");
    let data: Vec<String> = analysis
        .fitting_data
        .iter()
        .map(|d| format!("({}, {})", d.di, d.mean_time))
        .collect();
    println!("Data: [{}]", data.join(", "));
    match &analysis.fit {
        Ok(fit) => print_fit(fit),
        Err(err) => println!("Fit unavailable: {}", err),
    }
}
