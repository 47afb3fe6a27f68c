//! Scenario execution engine.
//!
//! One tokio task per VU. The controller loop ticks every 100ms, computes
//! the schedule's target and publishes it on a watch channel; VU `i` is
//! spawned the first time the target exceeds `i` and parks whenever the
//! target drops to `i` or below. Each VU keeps its own samples and check
//! counts and hands them back when joined.

use crate::check::CheckSet;
use crate::client::UsersClient;
use crate::error::{BenchError, BenchResult};
use crate::params::{select, Policy};
use crate::scenario::Scenario;
use crate::summary::{aggregate, CheckTally, RunMeta, RunSummary, Sample, VuReport};
use crate::users::UserRefs;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Controller tick
const TICK: Duration = Duration::from_millis(100);

/// Live counters, readable while a run is in progress
#[derive(Debug, Clone, Default)]
pub struct RunProgress {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    active_vus: AtomicU32,
    peak_vus: AtomicU32,
    requests: AtomicU64,
    failed: AtomicU64,
}

impl RunProgress {
    /// VUs the schedule currently asks for
    #[must_use]
    pub fn active_vus(&self) -> u32 {
        self.inner.active_vus.load(Ordering::Relaxed)
    }

    /// Most VUs active at once so far
    #[must_use]
    pub fn peak_vus(&self) -> u32 {
        self.inner.peak_vus.load(Ordering::Relaxed)
    }

    /// Requests completed so far
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.inner.requests.load(Ordering::Relaxed)
    }

    /// Failed requests so far
    #[must_use]
    pub fn failed_requests(&self) -> u64 {
        self.inner.failed.load(Ordering::Relaxed)
    }

    fn set_active(&self, vus: u32) {
        self.inner.active_vus.store(vus, Ordering::Relaxed);
        self.inner.peak_vus.fetch_max(vus, Ordering::Relaxed);
    }

    fn record(&self, failed: bool) {
        self.inner.requests.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.inner.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Read-only state shared by every VU of a run
struct VuContext {
    client: UsersClient,
    policy: Policy,
    checks: CheckSet,
    refs: Option<UserRefs>,
    think_time: Duration,
    deadline: Instant,
    progress: RunProgress,
}

/// Runs one scenario against one target
#[derive(Debug)]
pub struct Runner {
    client: UsersClient,
    scenario: Scenario,
    skip_health: bool,
    progress: RunProgress,
}

impl Runner {
    /// Create a runner
    pub fn new(client: UsersClient, scenario: Scenario) -> Self {
        Self {
            client,
            scenario,
            skip_health: false,
            progress: RunProgress::default(),
        }
    }

    /// Skip the `/healthz` preflight
    #[must_use]
    pub fn skip_health(mut self, skip: bool) -> Self {
        self.skip_health = skip;
        self
    }

    /// Scenario being run
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Handle to the live counters
    #[must_use]
    pub fn progress(&self) -> RunProgress {
        self.progress.clone()
    }

    /// Run the scenario to completion.
    ///
    /// Fails only before the load phase starts: an invalid scenario or a
    /// failed setup fetch. Request failures during the run are data.
    pub async fn run(&self) -> BenchResult<RunSummary> {
        let scenario = &self.scenario;
        scenario.validate()?;

        if !self.skip_health {
            match self.client.health_check().await {
                Ok(true) => tracing::debug!(base_url = self.client.base_url(), "health check passed"),
                Ok(false) => tracing::warn!(
                    base_url = self.client.base_url(),
                    "health check returned a non-success status, continuing"
                ),
                Err(e) => tracing::warn!(
                    base_url = self.client.base_url(),
                    error = %e,
                    "health check failed, continuing"
                ),
            }
        }

        let refs = if scenario.policy.needs_user_refs() {
            let refs = self.client.fetch_user_refs().await?;
            tracing::info!(count = refs.len(), "fetched user references");
            Some(refs)
        } else {
            None
        };

        let meta = RunMeta {
            scenario: scenario.name.clone(),
            tag: scenario.tag.clone(),
            base_url: self.client.base_url().to_string(),
            policy: scenario.policy.to_string(),
            schedule: scenario.schedule.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            user_refs: refs.as_ref().map_or(0, UserRefs::len),
        };

        tracing::info!(
            scenario = %scenario.name,
            policy = %scenario.policy,
            schedule = %scenario.schedule,
            "starting load phase"
        );

        let total = scenario.schedule.total_duration();
        let start = Instant::now();
        let deadline = start
            .checked_add(total)
            .ok_or_else(|| BenchError::scenario("schedule total duration is too long to run"))?;
        let ctx = Arc::new(VuContext {
            client: self.client.clone(),
            policy: scenario.policy,
            checks: scenario.checks.clone(),
            refs,
            think_time: scenario.think_time,
            deadline,
            progress: self.progress.clone(),
        });

        let (tx, _) = watch::channel(scenario.schedule.target_at(Duration::ZERO));
        let mut handles: Vec<JoinHandle<VuReport>> = Vec::new();
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let elapsed = start.elapsed();
            if elapsed >= total {
                break;
            }

            let target = scenario.schedule.target_at(elapsed);
            tx.send_if_modified(|current| {
                if *current == target {
                    false
                } else {
                    tracing::debug!(from = *current, to = target, "VU target changed");
                    *current = target;
                    true
                }
            });
            self.progress.set_active(target);

            while (handles.len() as u32) < target {
                let index = handles.len() as u32;
                tracing::debug!(vu = index, "spawning VU");
                handles.push(tokio::spawn(run_vu(index, Arc::clone(&ctx), tx.subscribe())));
            }
        }

        // Release parked VUs; active ones stop at the deadline
        tx.send_replace(0);
        drop(tx);
        self.progress.set_active(0);

        let spawned = handles.len();
        let mut reports = Vec::with_capacity(spawned);
        for handle in futures::future::join_all(handles).await {
            match handle {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!(error = %e, "VU task did not complete"),
            }
        }
        let elapsed = start.elapsed();

        tracing::info!(
            vus = spawned,
            elapsed_secs = elapsed.as_secs_f64(),
            "load phase finished"
        );

        Ok(aggregate(
            meta,
            CheckTally::with_names(scenario.checks.names()),
            reports,
            &scenario.thresholds,
            elapsed,
            self.progress.peak_vus(),
        ))
    }
}

/// Iterate until the deadline, parking while the target is at or below `index`
async fn run_vu(index: u32, ctx: Arc<VuContext>, mut target: watch::Receiver<u32>) -> VuReport {
    let mut rng = StdRng::from_entropy();
    let mut report = VuReport::default();

    while wait_for_turn(index, &mut target, ctx.deadline).await {

        let params = select(ctx.policy, ctx.refs.as_ref(), &mut rng);
        let outcome = ctx.client.send(&params).await;
        let failed = outcome.is_failed();
        if let Some(error) = &outcome.error {
            tracing::debug!(vu = index, path = %params.path(), %error, "request error");
        }

        report.samples.push(Sample {
            endpoint: params.endpoint(),
            latency: outcome.latency,
            failed,
        });
        report.checks.record(&ctx.checks.run(&outcome, &params));
        report.iterations += 1;
        ctx.progress.record(failed);

        tokio::time::sleep(ctx.think_time).await;
    }

    tracing::trace!(vu = index, iterations = report.iterations, "VU stopped");
    report
}

/// Park until the target exceeds `index`. False once the run is over.
async fn wait_for_turn(index: u32, target: &mut watch::Receiver<u32>, deadline: Instant) -> bool {
    loop {
        if Instant::now() >= deadline {
            return false;
        }
        let current = *target.borrow_and_update();
        if current > index {
            return true;
        }
        tracing::debug!(vu = index, target = current, "VU parked");
        if target.changed().await.is_err() {
            return false;
        }
    }
}
