//! usersbench: load scenarios for a paginated users REST API
//!
//! Drives `GET /users` and `GET /users/{id}` with virtual users (VUs) on a
//! constant or staged schedule, evaluates per-response checks, and decides
//! pass/fail from latency and failure-rate thresholds.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────────────────┐   ┌──────────┐
//! │ Scenario │──►│  Setup   │──►│ Controller (100ms)  │──►│ Summary  │
//! │ (YAML or │   │ GET      │   │  watch<target>      │   │ checks   │
//! │ built-in)│   │ /users   │   │  ├─ VU 0 ─┐         │   │ latency  │
//! └──────────┘   │ ?limit=  │   │  ├─ VU 1 ─┤ select  │   │ thresh-  │
//!                │ 200      │   │  └─ VU n ─┘ → GET   │   │ olds     │
//!                └──────────┘   └─────────────────────┘   └──────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use usersbench::{Runner, Scenario, TargetConfig, UsersClient};
//!
//! # async fn example() -> usersbench::BenchResult<()> {
//! let client = UsersClient::new(&TargetConfig::new("http://localhost:8080"));
//! let summary = Runner::new(client, Scenario::smoke_read()).run().await?;
//! println!("{}", usersbench::render_text(&summary));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod check;
mod client;
mod config;
mod error;
mod params;
mod report;
mod runner;
mod scenario;
mod schedule;
mod summary;
mod threshold;
mod users;

pub use check::{Check, CheckResult, CheckSet, NamedCheck};
pub use client::{Outcome, UsersClient};
pub use config::{TargetConfig, DEFAULT_BASE_URL};
pub use error::{BenchError, BenchResult};
pub use params::{
    select, Endpoint, Policy, RequestParams, DEFAULT_READ_RATIO, LIST_LIMIT, LIST_OFFSET_SPAN,
    SEED_LIMIT,
};
pub use report::{render_json, render_text};
pub use runner::{RunProgress, Runner};
pub use scenario::{Scenario, BUILTIN_NAMES, DEFAULT_THINK_TIME};
pub use schedule::{format_duration, parse_duration, Schedule, Stage};
pub use summary::{percentile, CheckCount, EndpointCount, LatencyStats, RunSummary};
pub use threshold::{Threshold, ThresholdResult};
pub use users::{UserId, UserRefs};
