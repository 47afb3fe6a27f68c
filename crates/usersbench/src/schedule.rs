//! VU schedules: constant and staged ramps.
//!
//! A schedule is a starting VU count plus ordered `(duration, target)`
//! stages. Within a stage the target moves linearly from the previous
//! stage's target; after the last stage it holds the final target.

use crate::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// One stage of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// How long the stage lasts
    #[serde(with = "duration_str")]
    pub duration: Duration,
    /// VU count reached at the end of the stage
    pub target: u32,
}

impl Stage {
    /// Create a stage
    #[must_use]
    pub const fn new(duration: Duration, target: u32) -> Self {
        Self { duration, target }
    }
}

/// Starting VUs plus stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// VU count at t=0
    #[serde(default)]
    pub start_vus: u32,
    /// Ordered stages
    pub stages: Vec<Stage>,
}

impl Schedule {
    /// Fixed VU count for a fixed duration
    #[must_use]
    pub fn constant(vus: u32, duration: Duration) -> Self {
        Self {
            start_vus: vus,
            stages: vec![Stage::new(duration, vus)],
        }
    }

    /// Staged ramp
    #[must_use]
    pub fn ramping(start_vus: u32, stages: Vec<Stage>) -> Self {
        Self { start_vus, stages }
    }

    /// Sum of stage durations, saturating at `Duration::MAX`
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.stages
            .iter()
            .fold(Duration::ZERO, |acc, s| acc.saturating_add(s.duration))
    }

    /// Largest VU count the schedule ever asks for
    #[must_use]
    pub fn max_vus(&self) -> u32 {
        self.stages
            .iter()
            .map(|s| s.target)
            .fold(self.start_vus, u32::max)
    }

    /// True when the VU count never changes
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.stages.iter().all(|s| s.target == self.start_vus)
    }

    /// VU target at `elapsed` into the run
    #[must_use]
    pub fn target_at(&self, elapsed: Duration) -> u32 {
        let mut from = self.start_vus;
        let mut stage_start = Duration::ZERO;

        for stage in &self.stages {
            let stage_end = stage_start.saturating_add(stage.duration);
            if elapsed < stage_end {
                let progress =
                    (elapsed - stage_start).as_secs_f64() / stage.duration.as_secs_f64();
                let range = f64::from(stage.target) - f64::from(from);
                return (f64::from(from) + range * progress).round() as u32;
            }
            from = stage.target;
            stage_start = stage_end;
        }

        from
    }

    /// Reject schedules that could never run
    pub fn validate(&self) -> BenchResult<()> {
        if self.stages.is_empty() {
            return Err(BenchError::scenario("schedule has no stages"));
        }
        let total = self
            .stages
            .iter()
            .try_fold(Duration::ZERO, |acc, s| acc.checked_add(s.duration))
            .ok_or_else(|| BenchError::scenario("schedule total duration overflows"))?;
        if total.is_zero() {
            return Err(BenchError::scenario("schedule has zero total duration"));
        }
        if Instant::now().checked_add(total).is_none() {
            return Err(BenchError::scenario(format!(
                "schedule total duration {} is too long to run",
                format_duration(total)
            )));
        }
        if self.max_vus() == 0 {
            return Err(BenchError::scenario("schedule never starts a VU"));
        }
        Ok(())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            return write!(
                f,
                "{} VUs for {}",
                self.start_vus,
                format_duration(self.total_duration())
            );
        }
        let mut from = self.start_vus;
        let parts: Vec<String> = self
            .stages
            .iter()
            .map(|s| {
                let part = if s.target == from {
                    format!("hold {} ({})", s.target, format_duration(s.duration))
                } else {
                    format!("{from}→{} ({})", s.target, format_duration(s.duration))
                };
                from = s.target;
                part
            })
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Parse a duration string like "100ms", "30s", "2m", "1h", or bare seconds.
pub fn parse_duration(s: &str) -> BenchResult<Duration> {
    let s = s.trim();
    let invalid = || BenchError::InvalidDuration(s.to_string());
    let scaled = |n: u64, unit: u64| {
        n.checked_mul(unit)
            .map(Duration::from_secs)
            .ok_or_else(invalid)
    };

    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.trim().parse().map_err(|_| invalid())?;
        Ok(Duration::from_millis(n))
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.trim().parse().map_err(|_| invalid())?;
        Ok(Duration::from_secs(n))
    } else if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.trim().parse().map_err(|_| invalid())?;
        scaled(n, 60)
    } else if let Some(hrs) = s.strip_suffix('h') {
        let n: u64 = hrs.trim().parse().map_err(|_| invalid())?;
        scaled(n, 3600)
    } else {
        let n: u64 = s.parse().map_err(|_| invalid())?;
        Ok(Duration::from_secs(n))
    }
}

/// Format a duration in the largest unit that divides it evenly
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms % 1000 != 0 {
        format!("{ms}ms")
    } else {
        let secs = d.as_secs();
        if secs != 0 && secs % 3600 == 0 {
            format!("{}h", secs / 3600)
        } else if secs != 0 && secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{secs}s")
        }
    }
}

/// Serde adapter: durations as "30s"-style strings, bare integers as seconds
pub(crate) mod duration_str {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Secs(u64),
    }

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => super::parse_duration(&s).map_err(de::Error::custom),
            Raw::Secs(n) => Ok(Duration::from_secs(n)),
        }
    }
}
