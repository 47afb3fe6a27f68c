//! Handler for `usersbench run`.

use crate::commands::{ReportFormat, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use usersbench::{
    parse_duration, render_json, render_text, BenchResult, RunSummary, Runner, Scenario,
    TargetConfig, UsersClient,
};

/// Progress refresh interval
const REFRESH: Duration = Duration::from_millis(250);

/// Resolve the scenario from a built-in name or a YAML file and apply overrides
pub fn resolve_scenario(args: &RunArgs) -> CliResult<Scenario> {
    let scenario = match (&args.file, &args.scenario) {
        (Some(path), _) => Scenario::load(path)?,
        (None, Some(name)) => {
            Scenario::builtin(name).ok_or_else(|| CliError::unknown_scenario(name))?
        }
        (None, None) => {
            return Err(CliError::config("either a scenario name or --file is required"));
        }
    };

    if args.vus == Some(0) {
        return Err(CliError::invalid_argument("--vus must be at least 1"));
    }
    let duration = args.duration.as_deref().map(parse_arg).transpose()?;
    let mut scenario = scenario.with_overrides(args.vus, duration);
    if let Some(think_time) = args.think_time.as_deref().map(parse_arg).transpose()? {
        scenario = scenario.with_think_time(think_time);
    }
    Ok(scenario)
}

fn parse_arg(value: &str) -> CliResult<Duration> {
    parse_duration(value).map_err(|e| CliError::invalid_argument(e.to_string()))
}

/// Execute the run command
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let scenario = resolve_scenario(args)?;
    let target = TargetConfig::from_optional(args.base_url.as_deref());
    let show_progress = !config.verbosity.is_quiet() && args.format == ReportFormat::Text;

    tracing::info!(
        scenario = %scenario.name,
        base_url = target.base_url(),
        "running scenario"
    );

    let runner = Runner::new(UsersClient::new(&target), scenario).skip_health(args.skip_health);
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create async runtime: {e}")))?;
    let summary = rt
        .block_on(run_with_progress(runner, show_progress))
        .map_err(|e| {
            if e.is_setup() {
                tracing::error!(base_url = target.base_url(), "setup failed, no iterations were run");
            }
            CliError::from(e)
        })?;

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&summary)),
        ReportFormat::Json => println!("{}", render_json(&summary)),
    }

    if let Some(path) = &args.output {
        write_json(&summary, path)?;
        if !config.verbosity.is_quiet() {
            eprintln!("Summary written to {}", path.display());
        }
    }

    verdict(config, &summary)
}

/// Drive the runner while refreshing a progress bar from its live counters
async fn run_with_progress(runner: Runner, show: bool) -> BenchResult<RunSummary> {
    let total = runner.scenario().schedule.total_duration();
    let progress = runner.progress();
    let pb = if show {
        progress_bar(total)
    } else {
        ProgressBar::hidden()
    };

    let start = Instant::now();
    let run = runner.run();
    tokio::pin!(run);
    let mut ticker = tokio::time::interval(REFRESH);

    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            _ = ticker.tick() => {
                pb.set_position(start.elapsed().min(total).as_millis() as u64);
                pb.set_message(format!(
                    "{} VUs │ {} reqs │ {} failed",
                    progress.active_vus(),
                    progress.requests(),
                    progress.failed_requests()
                ));
            }
        }
    };

    pb.finish_and_clear();
    result
}

fn progress_bar(total: Duration) -> ProgressBar {
    let pb = ProgressBar::new(total.as_millis() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {elapsed_precise} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

fn write_json(summary: &RunSummary, path: &Path) -> CliResult<()> {
    std::fs::write(path, render_json(summary)).map_err(|e| {
        CliError::report_generation(format!("cannot write {}: {e}", path.display()))
    })
}

/// Ok when every threshold held
fn verdict(config: &CliConfig, summary: &RunSummary) -> CliResult<()> {
    let total = summary.thresholds.len();
    let failed = summary.thresholds.iter().filter(|t| !t.passed).count();
    if failed > 0 {
        return Err(CliError::ThresholdsFailed { failed, total });
    }
    if !config.verbosity.is_quiet() {
        eprintln!(
            "{} {} threshold(s) passed",
            style("✓").green().bold(),
            total
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use usersbench::Schedule;

    fn args(scenario: Option<&str>) -> RunArgs {
        RunArgs {
            scenario: scenario.map(str::to_string),
            file: None,
            base_url: None,
            vus: None,
            duration: None,
            think_time: None,
            format: ReportFormat::Text,
            output: None,
            skip_health: false,
        }
    }

    #[test]
    fn test_resolve_builtin() {
        let scenario = resolve_scenario(&args(Some("ramp"))).unwrap();
        assert_eq!(scenario, Scenario::ramp());
    }

    #[test]
    fn test_resolve_unknown() {
        let err = resolve_scenario(&args(Some("soak"))).unwrap_err();
        assert!(matches!(err, CliError::UnknownScenario { .. }));
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let mut a = args(Some("steady"));
        a.vus = Some(3);
        a.duration = Some("5s".to_string());
        a.think_time = Some("250ms".to_string());
        let scenario = resolve_scenario(&a).unwrap();
        assert_eq!(scenario.schedule, Schedule::constant(3, Duration::from_secs(5)));
        assert_eq!(scenario.think_time, Duration::from_millis(250));
    }

    #[test]
    fn test_resolve_rejects_bad_overrides() {
        let mut a = args(Some("steady"));
        a.duration = Some("soon".to_string());
        assert!(matches!(
            resolve_scenario(&a).unwrap_err(),
            CliError::InvalidArgument { .. }
        ));

        let mut a = args(Some("steady"));
        a.duration = Some("400000000000000000m".to_string());
        assert!(matches!(
            resolve_scenario(&a).unwrap_err(),
            CliError::InvalidArgument { .. }
        ));

        let mut a = args(Some("steady"));
        a.vus = Some(0);
        assert!(matches!(
            resolve_scenario(&a).unwrap_err(),
            CliError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn test_resolve_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        Scenario::smoke_list().save(&path).unwrap();
        let mut a = args(None);
        a.file = Some(path);
        assert_eq!(resolve_scenario(&a).unwrap(), Scenario::smoke_list());
    }

    #[test]
    fn test_resolve_requires_a_source() {
        assert!(matches!(
            resolve_scenario(&args(None)).unwrap_err(),
            CliError::Config { .. }
        ));
    }
}
