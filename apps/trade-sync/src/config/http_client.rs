//! Outbound broker HTTP client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::broker::RetryPolicy;

/// Timeouts and retry behavior for broker requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Total attempts per request, including the first.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Base retry delay; retry `n` waits `n` times this.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Upper bound for a single retry delay.
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    /// Delay randomization in `[0, 1]`.
    #[serde(default)]
    pub jitter_factor: f64,
    /// `User-Agent` header; defaults to `trade-sync/<version>`.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            jitter_factor: 0.0,
            user_agent: None,
        }
    }
}

impl HttpClientConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry policy for broker requests.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_delay_ms),
            Duration::from_millis(self.max_retry_delay_ms),
            self.jitter_factor,
        )
    }
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_retry_attempts() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    1_000
}

const fn default_max_retry_delay_ms() -> u64 {
    30_000
}
