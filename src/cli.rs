//! Command-line interface for Skirmish

use clap::Parser;
use std::path::PathBuf;

use crate::combat::status::config::DEFAULT_STATUS_CONFIG;

/// Headless combat scenario runner
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a combat scenario headless and report the outcome")]
#[command(version)]
pub struct Args {
    /// Scenario JSON file to run
    #[arg(long, value_name = "SCENARIO_FILE")]
    pub scenario: PathBuf,

    /// Output path for the scenario report (overrides the scenario's own)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum scenario duration in seconds (overrides the scenario's own)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Status definitions file
    #[arg(long, value_name = "RON_FILE", default_value = DEFAULT_STATUS_CONFIG)]
    pub statuses: PathBuf,

    /// Print the combat log to stdout when the scenario ends
    #[arg(long)]
    pub print_log: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["skirmish", "--scenario", "demos/ambush.json"]).unwrap();
        assert_eq!(args.scenario, PathBuf::from("demos/ambush.json"));
        assert_eq!(args.statuses, PathBuf::from(DEFAULT_STATUS_CONFIG));
        assert!(args.output.is_none());
        assert!(args.max_duration.is_none());
    }

    #[test]
    fn test_scenario_is_required() {
        assert!(Args::try_parse_from(["skirmish"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "skirmish",
            "--scenario",
            "s.json",
            "--max-duration",
            "12.5",
            "--output",
            "out.json",
        ])
        .unwrap();
        assert_eq!(args.max_duration, Some(12.5));
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
    }
}
