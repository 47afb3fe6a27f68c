//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// usersbench: load scenarios for a users REST API
#[derive(Parser, Debug)]
#[command(name = "usersbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress progress and info logs)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a load scenario
    ///
    /// Exits 0 when every threshold holds, 1 otherwise (including setup
    /// failures).
    Run(RunArgs),

    /// List built-in scenarios
    List,

    /// Print a built-in scenario as YAML
    Show(ShowArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Built-in scenario name (smoke-list, smoke-read, smoke-mixed, steady, ramp)
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub scenario: Option<String>,

    /// Load the scenario from a YAML file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Base URL of the users API
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Run a constant number of VUs instead of the scenario's schedule
    #[arg(long)]
    pub vus: Option<u32>,

    /// Run for a fixed duration instead of the scenario's schedule (e.g. 30s, 2m)
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Pause after each iteration (e.g. 100ms, 1s)
    #[arg(long)]
    pub think_time: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Also write the JSON summary to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the /healthz preflight
    #[arg(long)]
    pub skip_health: bool,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Built-in scenario name
    pub scenario: String,

    /// Write the YAML to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Report format for the run command
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty JSON
    Json,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "usersbench",
            "run",
            "steady",
            "--vus",
            "5",
            "--duration",
            "10s",
            "--format",
            "json",
            "--skip-health",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.scenario.as_deref(), Some("steady"));
                assert_eq!(args.vus, Some(5));
                assert_eq!(args.duration.as_deref(), Some("10s"));
                assert_eq!(args.format, ReportFormat::Json);
                assert!(args.skip_health);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_scenario_or_file() {
        assert!(Cli::try_parse_from(["usersbench", "run"]).is_err());
        assert!(Cli::try_parse_from(["usersbench", "run", "--file", "s.yaml"]).is_ok());
        assert!(
            Cli::try_parse_from(["usersbench", "run", "ramp", "--file", "s.yaml"]).is_err()
        );
    }

    #[test]
    fn test_global_verbosity_flags() {
        let cli = Cli::try_parse_from(["usersbench", "list", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["usersbench", "-q", "list"]).unwrap();
        assert!(cli.quiet);
    }
}
