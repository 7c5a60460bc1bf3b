//! Token cache configuration.

use serde::{Deserialize, Serialize};

use crate::domain::auth::DEFAULT_EXPIRY_SKEW_MS;

/// Token lifetime handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensConfig {
    /// Refresh this many milliseconds before stated expiry.
    #[serde(default = "default_expiry_skew_ms")]
    pub expiry_skew_ms: u64,
    /// Lifetime assumed when a refresh response has no expiry.
    #[serde(default = "default_lease_secs")]
    pub default_lease_secs: u64,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            expiry_skew_ms: default_expiry_skew_ms(),
            default_lease_secs: default_lease_secs(),
        }
    }
}

impl TokensConfig {
    /// Expiry skew as a signed duration.
    #[must_use]
    pub fn expiry_skew(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.expiry_skew_ms).unwrap_or(i64::MAX))
    }

    /// Default lease.
    #[must_use]
    pub const fn default_lease(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.default_lease_secs)
    }
}

const fn default_expiry_skew_ms() -> u64 {
    DEFAULT_EXPIRY_SKEW_MS.unsigned_abs()
}

const fn default_lease_secs() -> u64 {
    20 * 60
}
