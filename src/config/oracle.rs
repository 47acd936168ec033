//! Scoring oracle configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Scoring oracle configuration
///
/// Covers both the HTTP client talking to the oracle service and the
/// worker pool that drains the scoring queue against it.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Oracle service API key
    pub api_key: String,

    /// Oracle service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Concurrent scoring workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Attempts per scoring job, the first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds; doubles per failure
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl OracleConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get retry backoff as Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Validate oracle configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("ORACLE_API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidOracleUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.workers == 0 || self.max_attempts == 0 {
            return Err(ValidationError::InvalidWorkerCount);
        }
        Ok(())
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            workers: default_workers(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_workers() -> usize {
    2
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}
