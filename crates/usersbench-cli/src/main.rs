//! usersbench CLI: load scenarios for a users REST API
//!
//! ## Usage
//!
//! ```bash
//! usersbench list                          # Built-in scenarios
//! usersbench show ramp                     # Scenario as YAML
//! usersbench run smoke-read                # Run against $BASE_URL
//! usersbench run steady --vus 20 -d 30s    # Override the schedule
//! usersbench run --file custom.yaml --format json --output out.json
//! ```

use clap::Parser;
use std::process::ExitCode;
use usersbench_cli::{handlers, logging, Cli, CliConfig, CliResult, Commands, Verbosity};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    logging::init(config.verbosity);

    match cli.command {
        Commands::Run(args) => handlers::execute_run(&config, &args),
        Commands::List => {
            handlers::execute_list(&config);
            Ok(())
        }
        Commands::Show(args) => handlers::execute_show(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new().with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
}
