//! Generic adapter transport settings.

use std::time::Duration;

use crate::broker::RetryPolicy;

/// Default token lease when a refresh response carries no expiry.
pub const DEFAULT_TOKEN_LEASE: Duration = Duration::from_secs(20 * 60);

/// Transport settings shared by every generic broker adapter.
#[derive(Debug, Clone)]
pub struct GenericAdapterConfig {
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy for transport and 5xx failures.
    pub retry: RetryPolicy,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Token lifetime assumed when the broker does not state one.
    pub default_token_lease: Duration,
}

impl Default for GenericAdapterConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            user_agent: default_user_agent(),
            default_token_lease: DEFAULT_TOKEN_LEASE,
        }
    }
}

impl GenericAdapterConfig {
    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the default token lease.
    #[must_use]
    pub const fn with_default_token_lease(mut self, lease: Duration) -> Self {
        self.default_token_lease = lease;
        self
    }
}

/// `trade-sync/<crate version>`.
#[must_use]
pub fn default_user_agent() -> String {
    format!("trade-sync/{}", env!("CARGO_PKG_VERSION"))
}
