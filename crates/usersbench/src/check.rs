//! Per-response checks.
//!
//! A failed check is data, not an error: it is tallied and the run carries
//! on. Which checks apply is decided per scenario, so the email check can
//! exist in one read variant without becoming a contract for all of them.

use crate::client::Outcome;
use crate::params::RequestParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A boolean assertion on one response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Status is exactly 200
    StatusOk,
    /// Body has a non-null `id`
    HasId,
    /// Body has a non-null `email`
    HasEmail,
    /// `items` is a non-empty array
    HasItems,
    /// `total` is a number greater than zero
    HasTotal,
    /// Echoed `limit` equals the requested limit
    LimitMatches,
    /// Echoed `offset` equals the requested offset
    OffsetMatches,
    /// `items` holds no more than the requested limit
    ItemsWithinLimit,
}

impl Check {
    /// Name used when the scenario does not give one
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::StatusOk => "status is 200",
            Self::HasId => "has user id",
            Self::HasEmail => "has email",
            Self::HasItems => "has items",
            Self::HasTotal => "has total",
            Self::LimitMatches => "limit matches",
            Self::OffsetMatches => "offset matches",
            Self::ItemsWithinLimit => "items within limit",
        }
    }

    /// Evaluate against a response to the given request
    #[must_use]
    pub fn evaluate(self, outcome: &Outcome, params: &RequestParams) -> bool {
        match self {
            Self::StatusOk => outcome.status == Some(200),
            Self::HasId => non_null(outcome.field("id")),
            Self::HasEmail => non_null(outcome.field("email")),
            Self::HasItems => items(outcome).is_some_and(|items| !items.is_empty()),
            Self::HasTotal => outcome
                .field("total")
                .and_then(Value::as_f64)
                .is_some_and(|total| total > 0.0),
            Self::LimitMatches => match params {
                RequestParams::ListPage { limit, .. } => echoed(outcome, "limit", *limit),
                RequestParams::ReadOne { .. } => false,
            },
            Self::OffsetMatches => match params {
                RequestParams::ListPage { offset, .. } => echoed(outcome, "offset", *offset),
                RequestParams::ReadOne { .. } => false,
            },
            Self::ItemsWithinLimit => match (params, items(outcome)) {
                (RequestParams::ListPage { limit, .. }, Some(items)) => items.len() <= *limit as usize,
                _ => false,
            },
        }
    }
}

fn non_null(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !v.is_null())
}

fn items(outcome: &Outcome) -> Option<&Vec<Value>> {
    outcome.field("items").and_then(Value::as_array)
}

fn echoed(outcome: &Outcome, field: &str, expected: u32) -> bool {
    outcome.field(field).and_then(Value::as_u64) == Some(u64::from(expected))
}

/// A check with the name it is reported under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCheck {
    /// Report name
    pub name: String,
    /// The assertion
    pub check: Check,
}

impl NamedCheck {
    /// Use the check's default name
    #[must_use]
    pub fn new(check: Check) -> Self {
        Self {
            name: check.default_name().to_string(),
            check,
        }
    }

    /// Use a custom name
    pub fn named(name: impl Into<String>, check: Check) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

/// Outcome of a single named check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Report name
    pub name: String,
    /// Whether the check held
    pub passed: bool,
}

/// Checks to run, per endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSet {
    /// Checks for `GET /users/{id}` responses
    #[serde(default)]
    pub read: Vec<NamedCheck>,
    /// Checks for `GET /users` responses
    #[serde(default)]
    pub list: Vec<NamedCheck>,
}

impl CheckSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a read check under its default name
    #[must_use]
    pub fn read(mut self, check: Check) -> Self {
        self.read.push(NamedCheck::new(check));
        self
    }

    /// Add a list check under its default name
    #[must_use]
    pub fn list(mut self, check: Check) -> Self {
        self.list.push(NamedCheck::new(check));
        self
    }

    /// Prefix every name with `read: ` or `list: `.
    ///
    /// Used by the mixed workload, where both endpoints report into one
    /// summary and plain names would collide.
    #[must_use]
    pub fn prefixed(mut self) -> Self {
        for c in &mut self.read {
            c.name = format!("read: {}", c.name);
        }
        for c in &mut self.list {
            c.name = format!("list: {}", c.name);
        }
        self
    }

    /// Checks that apply to a request
    #[must_use]
    pub fn for_request(&self, params: &RequestParams) -> &[NamedCheck] {
        match params {
            RequestParams::ReadOne { .. } => &self.read,
            RequestParams::ListPage { .. } => &self.list,
        }
    }

    /// Run the applicable checks
    #[must_use]
    pub fn run(&self, outcome: &Outcome, params: &RequestParams) -> Vec<CheckResult> {
        self.for_request(params)
            .iter()
            .map(|c| CheckResult {
                name: c.name.clone(),
                passed: c.check.evaluate(outcome, params),
            })
            .collect()
    }

    /// All check names, read checks first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.read.iter().chain(&self.list).map(|c| c.name.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::users::UserId;
    use serde_json::json;
    use std::time::Duration;

    fn ok(body: Value) -> Outcome {
        Outcome {
            status: Some(200),
            body: Some(body),
            latency: Duration::from_millis(3),
            error: None,
        }
    }

    fn read_params() -> RequestParams {
        RequestParams::ReadOne {
            id: UserId::new("u1"),
        }
    }

    fn list_params(offset: u32) -> RequestParams {
        RequestParams::ListPage { limit: 2, offset }
    }

    #[test]
    fn test_status_ok() {
        let params = read_params();
        assert!(Check::StatusOk.evaluate(&ok(json!({})), &params));
        let mut not_found = ok(json!({"error": "not_found"}));
        not_found.status = Some(404);
        assert!(!Check::StatusOk.evaluate(&not_found, &params));
    }

    #[test]
    fn test_has_id_and_email() {
        let params = read_params();
        let full = ok(json!({"id": "u1", "email": "u1@example.com"}));
        assert!(Check::HasId.evaluate(&full, &params));
        assert!(Check::HasEmail.evaluate(&full, &params));

        let null_email = ok(json!({"id": "u1", "email": null}));
        assert!(!Check::HasEmail.evaluate(&null_email, &params));
        assert!(!Check::HasId.evaluate(&ok(json!({})), &params));
    }

    #[test]
    fn test_non_json_body_fails_body_checks() {
        let outcome = Outcome {
            status: Some(200),
            body: None,
            latency: Duration::ZERO,
            error: None,
        };
        assert!(Check::StatusOk.evaluate(&outcome, &read_params()));
        assert!(!Check::HasId.evaluate(&outcome, &read_params()));
        assert!(!Check::HasItems.evaluate(&outcome, &list_params(0)));
    }

    #[test]
    fn test_list_checks() {
        let params = list_params(10);
        let body = ok(json!({"items": [{"id": 1}, {"id": 2}], "total": 10000, "limit": 2, "offset": 10}));
        for check in [
            Check::StatusOk,
            Check::HasItems,
            Check::HasTotal,
            Check::LimitMatches,
            Check::OffsetMatches,
            Check::ItemsWithinLimit,
        ] {
            assert!(check.evaluate(&body, &params), "{check:?}");
        }
    }

    #[test]
    fn test_list_checks_detect_mismatch() {
        let params = list_params(10);
        let body = ok(json!({"items": [], "total": 0, "limit": 200, "offset": 0}));
        assert!(!Check::HasItems.evaluate(&body, &params));
        assert!(!Check::HasTotal.evaluate(&body, &params));
        assert!(!Check::LimitMatches.evaluate(&body, &params));
        assert!(!Check::OffsetMatches.evaluate(&body, &params));
        assert!(Check::ItemsWithinLimit.evaluate(&body, &params));

        let overfull = ok(json!({"items": [1, 2, 3]}));
        assert!(!Check::ItemsWithinLimit.evaluate(&overfull, &params));
    }

    #[test]
    fn test_list_checks_against_read_request() {
        let body = ok(json!({"limit": 50, "offset": 0}));
        assert!(!Check::LimitMatches.evaluate(&body, &read_params()));
        assert!(!Check::OffsetMatches.evaluate(&body, &read_params()));
    }

    #[test]
    fn test_check_set_routes_by_request() {
        let set = CheckSet::new()
            .read(Check::StatusOk)
            .read(Check::HasId)
            .list(Check::StatusOk);
        assert_eq!(set.for_request(&read_params()).len(), 2);
        assert_eq!(set.for_request(&list_params(0)).len(), 1);
    }

    #[test]
    fn test_check_set_run() {
        let set = CheckSet::new().read(Check::StatusOk).read(Check::HasEmail);
        let results = set.run(&ok(json!({"id": "u1"})), &read_params());
        assert_eq!(
            results,
            vec![
                CheckResult {
                    name: "status is 200".to_string(),
                    passed: true
                },
                CheckResult {
                    name: "has email".to_string(),
                    passed: false
                },
            ]
        );
    }

    #[test]
    fn test_prefixed_names() {
        let set = CheckSet::new()
            .read(Check::StatusOk)
            .list(Check::HasItems)
            .prefixed();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["read: status is 200", "list: has items"]);
    }

    #[test]
    fn test_named_check_yaml() {
        let yaml = "name: custom\ncheck: has_total\n";
        let check: NamedCheck = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(check, NamedCheck::named("custom", Check::HasTotal));
    }
}
