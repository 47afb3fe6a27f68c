//! Per-VU records and the aggregated run summary.

use crate::check::CheckResult;
use crate::params::Endpoint;
use crate::threshold::{Threshold, ThresholdResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Individual request timing record
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub(crate) endpoint: Endpoint,
    pub(crate) latency: Duration,
    pub(crate) failed: bool,
}

/// Pass/fail counts of one named check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckCount {
    /// Check name
    pub name: String,
    /// Times it held
    pub passes: u64,
    /// Times it did not
    pub fails: u64,
}

/// Check counts in first-seen order
#[derive(Debug, Clone, Default)]
pub(crate) struct CheckTally(Vec<CheckCount>);

impl CheckTally {
    /// Pre-seed names so the report order follows the scenario definition
    pub(crate) fn with_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tally = Self::default();
        for name in names {
            tally.entry(name);
        }
        tally
    }

    fn entry(&mut self, name: &str) -> &mut CheckCount {
        let idx = match self.0.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.0.push(CheckCount {
                    name: name.to_string(),
                    passes: 0,
                    fails: 0,
                });
                self.0.len() - 1
            }
        };
        &mut self.0[idx]
    }

    pub(crate) fn record(&mut self, results: &[CheckResult]) {
        for r in results {
            let entry = self.entry(&r.name);
            if r.passed {
                entry.passes += 1;
            } else {
                entry.fails += 1;
            }
        }
    }

    pub(crate) fn merge(&mut self, other: Self) {
        for c in other.0 {
            let entry = self.entry(&c.name);
            entry.passes += c.passes;
            entry.fails += c.fails;
        }
    }

    pub(crate) fn into_counts(self) -> Vec<CheckCount> {
        self.0
    }
}

/// Everything one VU observed; returned when its task joins
#[derive(Debug, Default)]
pub(crate) struct VuReport {
    pub(crate) samples: Vec<Sample>,
    pub(crate) checks: CheckTally,
    pub(crate) iterations: u64,
}

/// Latency distribution in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Fastest request
    pub min_ms: f64,
    /// Mean
    pub avg_ms: f64,
    /// Median
    pub p50_ms: f64,
    /// 90th percentile
    pub p90_ms: f64,
    /// 95th percentile
    pub p95_ms: f64,
    /// 99th percentile
    pub p99_ms: f64,
    /// Slowest request
    pub max_ms: f64,
}

impl LatencyStats {
    /// Compute from sorted samples. Zeroes for an empty slice.
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Self {
        if sorted.is_empty() {
            return Self::default();
        }
        Self {
            min_ms: sorted[0],
            avg_ms: sorted.iter().sum::<f64>() / sorted.len() as f64,
            p50_ms: percentile(sorted, 0.50),
            p90_ms: percentile(sorted, 0.90),
            p95_ms: percentile(sorted, 0.95),
            p99_ms: percentile(sorted, 0.99),
            max_ms: sorted[sorted.len() - 1],
        }
    }
}

/// Requests per endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCount {
    /// Endpoint label
    pub endpoint: String,
    /// Requests sent
    pub requests: u64,
    /// Requests that failed
    pub failed: u64,
}

/// Descriptive fields of a run, known before any request is sent
#[derive(Debug, Clone)]
pub(crate) struct RunMeta {
    pub(crate) scenario: String,
    pub(crate) tag: String,
    pub(crate) base_url: String,
    pub(crate) policy: String,
    pub(crate) schedule: String,
    pub(crate) started_at: String,
    pub(crate) user_refs: usize,
}

/// Results of a scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique id of this run
    pub run_id: Uuid,
    /// Scenario name
    pub scenario: String,
    /// `test_type` tag
    pub tag: String,
    /// Target base URL
    pub base_url: String,
    /// Request policy label
    pub policy: String,
    /// Schedule description
    pub schedule: String,
    /// RFC 3339 start time
    pub started_at: String,
    /// Wall time of the load phase (seconds)
    pub elapsed_secs: f64,
    /// Number of seeded user references (0 when setup was skipped)
    pub user_refs: usize,
    /// Most VUs that ran at once
    pub peak_vus: u32,
    /// Completed iterations
    pub iterations: u64,
    /// Requests sent
    pub requests: u64,
    /// Requests with a transport error or a status outside 200..=399
    pub failed_requests: u64,
    /// `failed_requests / requests`
    pub failed_rate: f64,
    /// Requests per second
    pub throughput_rps: f64,
    /// Check pass/fail counts
    pub checks: Vec<CheckCount>,
    /// Latency over all requests
    pub latency: LatencyStats,
    /// Requests per endpoint
    pub endpoints: Vec<EndpointCount>,
    /// Threshold outcomes
    pub thresholds: Vec<ThresholdResult>,
}

impl RunSummary {
    /// All thresholds held
    #[must_use]
    pub fn passed(&self) -> bool {
        self.thresholds.iter().all(|t| t.passed)
    }

    /// Total passing and failing check evaluations
    #[must_use]
    pub fn check_totals(&self) -> (u64, u64) {
        self.checks
            .iter()
            .fold((0, 0), |(p, f), c| (p + c.passes, f + c.fails))
    }

    /// Look up one check by name
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&CheckCount> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Merge VU reports and evaluate thresholds
pub(crate) fn aggregate(
    meta: RunMeta,
    mut tally: CheckTally,
    reports: Vec<VuReport>,
    thresholds: &[Threshold],
    elapsed: Duration,
    peak_vus: u32,
) -> RunSummary {
    let mut latencies = Vec::new();
    let mut endpoints: BTreeMap<Endpoint, (u64, u64)> = BTreeMap::new();
    let mut iterations = 0;
    let mut failed_requests = 0u64;

    for report in reports {
        iterations += report.iterations;
        tally.merge(report.checks);
        for sample in report.samples {
            latencies.push(sample.latency.as_secs_f64() * 1000.0);
            let entry = endpoints.entry(sample.endpoint).or_default();
            entry.0 += 1;
            if sample.failed {
                entry.1 += 1;
                failed_requests += 1;
            }
        }
    }
    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let requests = latencies.len() as u64;
    let failed_rate = if requests == 0 {
        0.0
    } else {
        failed_requests as f64 / requests as f64
    };
    let elapsed_secs = elapsed.as_secs_f64();
    let throughput_rps = if elapsed_secs > 0.0 {
        requests as f64 / elapsed_secs
    } else {
        0.0
    };

    RunSummary {
        run_id: Uuid::new_v4(),
        scenario: meta.scenario,
        tag: meta.tag,
        base_url: meta.base_url,
        policy: meta.policy,
        schedule: meta.schedule,
        started_at: meta.started_at,
        elapsed_secs,
        user_refs: meta.user_refs,
        peak_vus,
        iterations,
        requests,
        failed_requests,
        failed_rate,
        throughput_rps,
        checks: tally.into_counts(),
        latency: LatencyStats::from_sorted(&latencies),
        endpoints: endpoints
            .into_iter()
            .map(|(endpoint, (requests, failed))| EndpointCount {
                endpoint: endpoint.to_string(),
                requests,
                failed,
            })
            .collect(),
        thresholds: thresholds
            .iter()
            .map(|t| t.evaluate(&latencies, failed_rate))
            .collect(),
    }
}

/// Percentile of a sorted slice, `p` in [0, 1]: the element at index
/// `round((n - 1) * p)`. 0.0 when empty.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
