//! Target configuration.

use serde::{Deserialize, Serialize};

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Where the users API lives.
///
/// Built once by the caller and handed to [`crate::UsersClient`]; the library
/// never reads the environment on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    base_url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TargetConfig {
    /// Create a config for the given base URL (trailing slashes are dropped)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve from an optional value, falling back to the default.
    ///
    /// Empty strings count as unset.
    pub fn from_optional(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Self::new(v),
            _ => Self::default(),
        }
    }

    /// Returns the base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
