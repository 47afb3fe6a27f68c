//! Scenario descriptors and the built-in profiles.
//!
//! Scenarios differ only in data: schedule, request policy, check set and
//! thresholds. They round-trip through YAML so custom profiles can be
//! written by hand.

use crate::check::{Check, CheckSet};
use crate::error::{BenchError, BenchResult};
use crate::params::Policy;
use crate::schedule::{duration_str, Schedule, Stage};
use crate::threshold::Threshold;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pause after each iteration
pub const DEFAULT_THINK_TIME: Duration = Duration::from_millis(100);

/// Names of the built-in scenarios, in display order
pub const BUILTIN_NAMES: [&str; 5] = ["smoke-list", "smoke-read", "smoke-mixed", "steady", "ramp"];

fn default_think_time() -> Duration {
    DEFAULT_THINK_TIME
}

/// A load profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// `test_type` tag carried into the summary
    pub tag: String,
    /// VU schedule
    pub schedule: Schedule,
    /// Request selection policy
    pub policy: Policy,
    /// Pause after each iteration
    #[serde(with = "duration_str", default = "default_think_time")]
    pub think_time: Duration,
    /// Checks per endpoint
    #[serde(default)]
    pub checks: CheckSet,
    /// Run-level pass/fail criteria
    #[serde(default)]
    pub thresholds: Vec<Threshold>,
}

impl Scenario {
    /// Create a scenario with no checks or thresholds
    pub fn new(name: &str, tag: &str, schedule: Schedule, policy: Policy) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            tag: tag.to_string(),
            schedule,
            policy,
            think_time: DEFAULT_THINK_TIME,
            checks: CheckSet::new(),
            thresholds: Vec::new(),
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Set the check set
    #[must_use]
    pub fn with_checks(mut self, checks: CheckSet) -> Self {
        self.checks = checks;
        self
    }

    /// Add a threshold
    #[must_use]
    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.thresholds.push(threshold);
        self
    }

    /// Set the think time
    #[must_use]
    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    /// Replace the schedule by a constant one.
    ///
    /// Whichever of `vus`/`duration` is missing comes from the current
    /// schedule's peak VUs or total duration. No-op when both are `None`.
    #[must_use]
    pub fn with_overrides(mut self, vus: Option<u32>, duration: Option<Duration>) -> Self {
        if vus.is_some() || duration.is_some() {
            let vus = vus.unwrap_or_else(|| self.schedule.max_vus());
            let duration = duration.unwrap_or_else(|| self.schedule.total_duration());
            self.schedule = Schedule::constant(vus, duration);
        }
        self
    }

    /// Reject scenarios that could never run
    pub fn validate(&self) -> BenchResult<()> {
        if self.name.trim().is_empty() {
            return Err(BenchError::scenario("name is empty"));
        }
        self.schedule.validate()?;
        if let Policy::Mixed { read_ratio } = self.policy {
            if !(0.0..=1.0).contains(&read_ratio) {
                return Err(BenchError::scenario(format!(
                    "read_ratio {read_ratio} is outside [0, 1]"
                )));
            }
        }
        for t in &self.thresholds {
            match *t {
                Threshold::Latency { percentile, .. } if !(percentile > 0.0 && percentile <= 100.0) => {
                    return Err(BenchError::scenario(format!(
                        "percentile {percentile} is outside (0, 100]"
                    )));
                }
                Threshold::FailedRate { max } if !(0.0..=1.0).contains(&max) => {
                    return Err(BenchError::scenario(format!(
                        "failed rate bound {max} is outside [0, 1]"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> BenchResult<Self> {
        let scenario: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| BenchError::scenario(format!("failed to parse YAML: {e}")))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> BenchResult<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| BenchError::scenario(format!("failed to write YAML: {e}")))
    }

    /// Load from file
    pub fn load(path: &Path) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BenchError::scenario(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Save to file
    pub fn save(&self, path: &Path) -> BenchResult<()> {
        let content = self.to_yaml()?;
        std::fs::write(path, content)
            .map_err(|e| BenchError::scenario(format!("cannot write {}: {e}", path.display())))
    }

    // -------------------------------------------------------------------------
    // Built-in profiles
    // -------------------------------------------------------------------------

    /// Look up a built-in scenario by name
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "smoke-list" => Some(Self::smoke_list()),
            "smoke-read" => Some(Self::smoke_read()),
            "smoke-mixed" => Some(Self::smoke_mixed()),
            "steady" => Some(Self::steady()),
            "ramp" => Some(Self::ramp()),
            _ => None,
        }
    }

    /// All built-in scenarios
    #[must_use]
    pub fn builtins() -> Vec<Self> {
        BUILTIN_NAMES.iter().filter_map(|n| Self::builtin(n)).collect()
    }

    /// 10 VUs for 30s paging through the list endpoint
    #[must_use]
    pub fn smoke_list() -> Self {
        Self::new(
            "smoke-list",
            "smoke",
            Schedule::constant(10, Duration::from_secs(30)),
            Policy::ListPage,
        )
        .with_description("Random pages of 50 users; checks the echoed pagination fields")
        .with_checks(
            CheckSet::new()
                .list(Check::StatusOk)
                .list(Check::HasItems)
                .list(Check::HasTotal)
                .list(Check::LimitMatches)
                .list(Check::OffsetMatches),
        )
        .with_threshold(Threshold::latency(95.0, 150.0))
        .with_threshold(Threshold::latency(99.0, 300.0))
        .with_threshold(Threshold::failed_rate(0.01))
    }

    /// 10 VUs for 30s reading single users, including the email check
    #[must_use]
    pub fn smoke_read() -> Self {
        Self::new(
            "smoke-read",
            "smoke",
            Schedule::constant(10, Duration::from_secs(30)),
            Policy::ReadOne,
        )
        .with_description("Random seeded users by id; checks id and email are present")
        .with_checks(
            CheckSet::new()
                .read(Check::StatusOk)
                .read(Check::HasId)
                .read(Check::HasEmail),
        )
        .with_threshold(Threshold::latency(95.0, 100.0))
        .with_threshold(Threshold::latency(99.0, 200.0))
        .with_threshold(Threshold::failed_rate(0.01))
    }

    /// 10 VUs for 30s, 70% single reads and 30% list pages
    #[must_use]
    pub fn smoke_mixed() -> Self {
        Self::new(
            "smoke-mixed",
            "smoke",
            Schedule::constant(10, Duration::from_secs(30)),
            Policy::mixed(),
        )
        .with_description("70% single-user reads, 30% list pages")
        .with_checks(
            CheckSet::new()
                .read(Check::StatusOk)
                .read(Check::HasId)
                .list(Check::StatusOk)
                .list(Check::HasItems)
                .prefixed(),
        )
        .with_threshold(Threshold::latency(95.0, 150.0))
        .with_threshold(Threshold::latency(99.0, 300.0))
        .with_threshold(Threshold::failed_rate(0.01))
    }

    /// 100 VUs for 2m reading single users
    #[must_use]
    pub fn steady() -> Self {
        Self::new(
            "steady",
            "steady",
            Schedule::constant(100, Duration::from_secs(120)),
            Policy::ReadOne,
        )
        .with_description("Sustained single-user reads")
        .with_checks(CheckSet::new().read(Check::StatusOk).read(Check::HasId))
        .with_threshold(Threshold::latency(95.0, 100.0))
        .with_threshold(Threshold::latency(99.0, 200.0))
        .with_threshold(Threshold::failed_rate(0.01))
    }

    /// 0→200 VUs over 2m, hold 2m, down to 0 over 1m
    #[must_use]
    pub fn ramp() -> Self {
        Self::new(
            "ramp",
            "ramp",
            Schedule::ramping(
                0,
                vec![
                    Stage::new(Duration::from_secs(120), 200),
                    Stage::new(Duration::from_secs(120), 200),
                    Stage::new(Duration::from_secs(60), 0),
                ],
            ),
            Policy::ReadOne,
        )
        .with_description("Gradual ramp to 200 VUs, hold, ramp down")
        .with_checks(CheckSet::new().read(Check::StatusOk).read(Check::HasId))
        .with_threshold(Threshold::latency(95.0, 150.0))
        .with_threshold(Threshold::latency(99.0, 300.0))
        .with_threshold(Threshold::failed_rate(0.05))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_valid() {
        let all = Scenario::builtins();
        assert_eq!(all.len(), BUILTIN_NAMES.len());
        for s in &all {
            s.validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_unknown() {
        assert!(Scenario::builtin("soak").is_none());
    }

    #[test]
    fn test_profiles() {
        let steady = Scenario::steady();
        assert_eq!(steady.schedule, Schedule::constant(100, Duration::from_secs(120)));
        assert_eq!(steady.policy, Policy::ReadOne);
        assert_eq!(steady.think_time, Duration::from_millis(100));

        let ramp = Scenario::ramp();
        assert_eq!(ramp.schedule.max_vus(), 200);
        assert_eq!(ramp.schedule.total_duration(), Duration::from_secs(300));
        assert!(ramp.thresholds.contains(&Threshold::failed_rate(0.05)));
    }

    #[test]
    fn test_email_check_only_in_smoke_read() {
        for s in Scenario::builtins() {
            let has_email = s.checks.read.iter().any(|c| c.check == Check::HasEmail);
            assert_eq!(has_email, s.name == "smoke-read", "{}", s.name);
        }
    }

    #[test]
    fn test_mixed_check_names() {
        let names: Vec<String> = Scenario::smoke_mixed()
            .checks
            .names()
            .map(str::to_string)
            .collect();
        assert_eq!(
            names,
            vec![
                "read: status is 200",
                "read: has user id",
                "list: status is 200",
                "list: has items"
            ]
        );
    }

    #[test]
    fn test_overrides() {
        let s = Scenario::ramp().with_overrides(Some(5), None);
        assert_eq!(s.schedule, Schedule::constant(5, Duration::from_secs(300)));

        let s = Scenario::steady().with_overrides(None, Some(Duration::from_secs(10)));
        assert_eq!(s.schedule, Schedule::constant(100, Duration::from_secs(10)));

        let s = Scenario::ramp().with_overrides(None, None);
        assert_eq!(s.schedule, Scenario::ramp().schedule);
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut s = Scenario::smoke_mixed();
        s.policy = Policy::Mixed { read_ratio: 1.5 };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let s = Scenario::steady().with_threshold(Threshold::latency(0.0, 10.0));
        assert!(s.validate().is_err());
        let s = Scenario::steady().with_threshold(Threshold::failed_rate(2.0));
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_preserves_builtin() {
        for s in Scenario::builtins() {
            let yaml = s.to_yaml().unwrap();
            let back = Scenario::from_yaml(&yaml).unwrap();
            assert_eq!(back, s);
        }
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r"
name: quick
tag: smoke
schedule:
  stages:
    - duration: 5s
      target: 2
policy:
  type: list_page
";
        let s = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(s.think_time, DEFAULT_THINK_TIME);
        assert!(s.thresholds.is_empty());
        assert!(s.checks.list.is_empty());
        assert_eq!(s.schedule.start_vus, 0);
    }

    #[test]
    fn test_yaml_with_huge_stages_is_rejected() {
        let yaml = r"
name: forever
tag: soak
schedule:
  stages:
    - duration: 18446744073709551615
      target: 1
    - duration: 18446744073709551615
      target: 1
policy:
  type: list_page
";
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, BenchError::Scenario { .. }));
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Scenario::from_yaml("name: [").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.yaml");
        Scenario::ramp().save(&path).unwrap();
        let loaded = Scenario::load(&path).unwrap();
        assert_eq!(loaded, Scenario::ramp());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Scenario::load(Path::new("/nonexistent/scenario.yaml")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
