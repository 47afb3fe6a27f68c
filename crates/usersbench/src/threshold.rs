//! Run-level pass/fail criteria, evaluated once after the run.

use crate::summary::percentile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bound on an aggregate metric of the whole run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Threshold {
    /// Latency percentile must stay under a bound
    Latency {
        /// Percentile in (0, 100]
        percentile: f64,
        /// Exclusive upper bound in milliseconds
        max_ms: f64,
    },
    /// Fraction of failed requests must stay under a bound
    FailedRate {
        /// Exclusive upper bound in [0, 1]
        max: f64,
    },
}

impl Threshold {
    /// Latency percentile bound
    #[must_use]
    pub const fn latency(percentile: f64, max_ms: f64) -> Self {
        Self::Latency { percentile, max_ms }
    }

    /// Failed-request rate bound
    #[must_use]
    pub const fn failed_rate(max: f64) -> Self {
        Self::FailedRate { max }
    }

    /// Metric the threshold applies to
    #[must_use]
    pub const fn metric(&self) -> &'static str {
        match self {
            Self::Latency { .. } => "http_req_duration",
            Self::FailedRate { .. } => "http_req_failed",
        }
    }

    /// Evaluate against the run's sorted latencies (ms) and failure rate
    #[must_use]
    pub fn evaluate(&self, sorted_latencies_ms: &[f64], failed_rate: f64) -> ThresholdResult {
        let (passed, actual) = match *self {
            Self::Latency { percentile: p, max_ms } => {
                let actual = percentile(sorted_latencies_ms, p / 100.0);
                // No samples means nothing breached the bound
                let passed = sorted_latencies_ms.is_empty() || actual < max_ms;
                (passed, format!("{actual:.2}ms"))
            }
            Self::FailedRate { max } => (failed_rate < max, format!("{:.2}%", failed_rate * 100.0)),
        };
        ThresholdResult {
            metric: self.metric().to_string(),
            threshold: self.to_string(),
            passed,
            actual,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latency { percentile, max_ms } => write!(f, "p({percentile})<{max_ms}"),
            Self::FailedRate { max } => write!(f, "rate<{max}"),
        }
    }
}

/// Outcome of one threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    /// Metric name
    pub metric: String,
    /// Threshold expression
    pub threshold: String,
    /// Whether it held
    pub passed: bool,
    /// Observed value
    pub actual: String,
}
