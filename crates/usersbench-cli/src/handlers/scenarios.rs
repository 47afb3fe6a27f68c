//! Handlers for `usersbench list` and `usersbench show`.

use crate::commands::ShowArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use console::style;
use usersbench::Scenario;

/// Render the built-in scenario table
#[must_use]
pub fn render_list(scenarios: &[Scenario]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<12} {:<7} {:<18} {}\n",
        "NAME", "TAG", "POLICY", "SCHEDULE"
    ));
    for s in scenarios {
        output.push_str(&format!(
            "{:<12} {:<7} {:<18} {}\n",
            s.name,
            s.tag,
            s.policy.to_string(),
            s.schedule
        ));
    }
    output
}

/// Execute the list command
pub fn execute_list(config: &CliConfig) {
    let scenarios = Scenario::builtins();
    if config.verbosity.is_verbose() {
        for s in &scenarios {
            println!("{}", style(&s.name).bold());
            println!("  {}", s.description);
            println!("  policy:     {}", s.policy);
            println!("  schedule:   {}", s.schedule);
            let thresholds: Vec<String> = s.thresholds.iter().map(ToString::to_string).collect();
            println!("  thresholds: {}", thresholds.join(", "));
            println!();
        }
    } else {
        print!("{}", render_list(&scenarios));
    }
}

/// Execute the show command
pub fn execute_show(config: &CliConfig, args: &ShowArgs) -> CliResult<()> {
    let scenario =
        Scenario::builtin(&args.scenario).ok_or_else(|| CliError::unknown_scenario(&args.scenario))?;

    match &args.output {
        Some(path) => {
            scenario.save(path)?;
            if !config.verbosity.is_quiet() {
                eprintln!(
                    "{} wrote {} to {}",
                    style("✓").green().bold(),
                    scenario.name,
                    path.display()
                );
            }
        }
        None => print!("{}", scenario.to_yaml()?),
    }
    Ok(())
}
