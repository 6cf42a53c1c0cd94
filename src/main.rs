//! Skirmish - headless combat scenario runner
//!
//! Loads status definitions and a scenario, runs it to completion and prints
//! a summary.

use std::process::ExitCode;

use skirmish::cli;
use skirmish::combat::error::ConfigError;
use skirmish::combat::status::load_status_definitions;
use skirmish::headless::{run_scenario, ScenarioConfig, ScenarioResult};

fn main() -> ExitCode {
    let args = cli::parse_args();
    match run(&args) {
        Ok(result) => {
            print_summary(&result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &cli::Args) -> Result<ScenarioResult, ConfigError> {
    let statuses = load_status_definitions(&args.statuses)?;

    let mut config = ScenarioConfig::load_from_file(&args.scenario)?;
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(output) = &args.output {
        config.output_path = Some(output.to_string_lossy().into_owned());
    }

    println!("Starting headless scenario {}...", args.scenario.display());
    println!("  Player: {}", config.player.name);
    println!("  Units: {}", config.units.len());
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let result = run_scenario(&config, statuses, true)?;
    if args.print_log {
        for entry in &result.log {
            println!("[{:>6.2}] {:?}: {}", entry.timestamp, entry.event_type, entry.message);
        }
    }
    Ok(result)
}

fn print_summary(result: &ScenarioResult) {
    println!("Outcome: {:?} after {:.1}s", result.outcome, result.duration);
    for report in std::iter::once(&result.player).chain(result.units.iter()) {
        println!(
            "  {:<12} {:>4}/{:<4} shield {:>3} {}{}",
            report.name,
            report.final_health,
            report.max_health,
            report.final_shield,
            if report.survived { "alive" } else { "dead" },
            report
                .final_state
                .map(|state| format!(" ({:?})", state))
                .unwrap_or_default(),
        );
    }
}
