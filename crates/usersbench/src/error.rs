//! Error types for scenario setup and configuration.
//!
//! Only failures that abort a run live here. Per-iteration problems (bad
//! status, missing fields, transport errors under load) are recorded as
//! check results and failed-request counts instead.

use thiserror::Error;

/// Result type for usersbench operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that abort a scenario run or reject its configuration
#[derive(Debug, Error)]
pub enum BenchError {
    /// Seed fetch returned something other than 200
    #[error("Failed to fetch users: {status}")]
    Setup {
        /// HTTP status code of the seed fetch
        status: u16,
    },

    /// Seed fetch succeeded but returned no users
    #[error("Failed to fetch users: seed page has no items")]
    EmptyUserSet,

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Scenario definition is invalid
    #[error("Invalid scenario: {message}")]
    Scenario {
        /// Error message
        message: String,
    },

    /// Duration string could not be parsed
    #[error("Invalid duration: {0}. Use 30s, 2m, 1h or 100ms")]
    InvalidDuration(String),
}

impl BenchError {
    /// Create a scenario error
    #[must_use]
    pub fn scenario(message: impl Into<String>) -> Self {
        Self::Scenario {
            message: message.into(),
        }
    }

    /// Whether this error came from the setup phase
    #[must_use]
    pub const fn is_setup(&self) -> bool {
        matches!(self, Self::Setup { .. } | Self::EmptyUserSet)
    }
}
