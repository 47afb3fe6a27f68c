//! HTTP client for the users API.
//!
//! Works against any server exposing `GET /users`, `GET /users/{id}` and
//! `GET /healthz` with the paginated JSON shape
//! `{ items, total, limit, offset }`.

use crate::config::TargetConfig;
use crate::error::{BenchError, BenchResult};
use crate::params::RequestParams;
use crate::users::{SeedPage, UserRefs};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// What came back from one request.
///
/// Transport failures are captured here rather than returned as `Err`, so
/// the iteration loop can record them and move on.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// HTTP status, absent on transport error
    pub status: Option<u16>,
    /// Parsed JSON body, absent when the body was not JSON
    pub body: Option<Value>,
    /// Time from sending the request to having read the full body
    pub latency: Duration,
    /// Transport or body read error message
    pub error: Option<String>,
}

impl Outcome {
    /// Failed in the `http_req_failed` sense: transport error, a body that
    /// could not be read, or a status outside 200..=399
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some() || !matches!(self.status, Some(200..=399))
    }

    /// Look up a top-level field of the body
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get(name))
    }
}

/// Client for the users API
#[derive(Debug, Clone)]
pub struct UsersClient {
    base_url: String,
    client: reqwest::Client,
}

impl UsersClient {
    /// Create a client for the given target
    pub fn new(target: &TargetConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(target, client)
    }

    /// Create a client with a custom reqwest client (for custom timeouts, etc.)
    pub fn with_client(target: &TargetConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: target.base_url().to_string(),
            client,
        }
    }

    /// Returns the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a set of request parameters
    #[must_use]
    pub fn url_for(&self, params: &RequestParams) -> String {
        format!("{}{}", self.base_url, params.path())
    }

    /// Issue one GET and capture the outcome. Never fails.
    pub async fn send(&self, params: &RequestParams) -> Outcome {
        let url = self.url_for(params);
        let start = Instant::now();

        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                return Outcome {
                    status: None,
                    body: None,
                    latency: start.elapsed(),
                    error: Some(e.to_string()),
                };
            }
        };

        let status = resp.status().as_u16();
        let (body, error) = match resp.bytes().await {
            Ok(bytes) => (serde_json::from_slice::<Value>(&bytes).ok(), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let latency = start.elapsed();
        tracing::trace!(%url, status, latency_ms = latency.as_millis() as u64, "request");

        Outcome {
            status: Some(status),
            body,
            latency,
            error,
        }
    }

    /// Setup phase: fetch the first page of 200 users and keep their ids.
    ///
    /// Any status other than 200 is fatal, as is an empty page.
    pub async fn fetch_user_refs(&self) -> BenchResult<UserRefs> {
        let url = self.url_for(&RequestParams::seed_page());
        let resp = self.client.get(&url).send().await?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(BenchError::Setup { status });
        }

        let bytes = resp.bytes().await?;
        let page: SeedPage = serde_json::from_slice(&bytes)?;
        UserRefs::new(page.into_ids())
    }

    /// Probe `GET /healthz`
    pub async fn health_check(&self) -> BenchResult<bool> {
        let url = format!("{}/healthz", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.status().is_success())
    }
}
