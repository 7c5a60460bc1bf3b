//! Retry policy with linear backoff for broker API calls.
//!
//! The delay before retry `n` is `base_delay * n`, capped at `max_delay`,
//! optionally randomized by a jitter factor.
//!
//! # Retryable Errors
//!
//! | Retryable | Non-Retryable |
//! |-----------|---------------|
//! | No response (connect, DNS, timeout) | HTTP 4xx |
//! | HTTP 5xx | Malformed response body |
//!
//! # Example
//!
//! ```rust,ignore
//! use trade_sync::broker::{LinearBackoff, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! let mut backoff = LinearBackoff::new(&policy);
//!
//! let delay1 = backoff.next_backoff(); // 1s
//! let delay2 = backoff.next_backoff(); // 2s
//! let delay3 = backoff.next_backoff(); // None, 3 attempts used
//! ```

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retry policy configuration for broker API calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one (default: 3).
    pub max_attempts: u32,
    /// Delay unit multiplied by the attempt number (default: 1s).
    pub base_delay: Duration,
    /// Upper bound for a single delay (default: 30s).
    pub max_delay: Duration,
    /// Jitter factor for randomization (default: 0.0, deterministic).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.0,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with custom settings.
    #[must_use]
    pub const fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        jitter_factor: f64,
    ) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            jitter_factor,
        }
    }

    /// Single attempt, no retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter_factor: 0.0,
        }
    }
}

/// Calculator for linear backoff with optional jitter.
#[derive(Debug)]
pub struct LinearBackoff {
    current_attempt: u32,
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter_factor: f64,
}

impl LinearBackoff {
    /// Create a new backoff calculator from a retry policy.
    #[must_use]
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            current_attempt: 1,
            max_attempts: policy.max_attempts.max(1),
            base_delay_ms: u64::try_from(policy.base_delay.as_millis()).unwrap_or(u64::MAX),
            max_delay_ms: u64::try_from(policy.max_delay.as_millis()).unwrap_or(u64::MAX),
            jitter_factor: policy.jitter_factor.clamp(0.0, 1.0),
        }
    }

    /// Delay to wait after the current attempt failed.
    ///
    /// Returns `None` once every attempt has been used.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.current_attempt >= self.max_attempts {
            return None;
        }

        let base_ms = self
            .base_delay_ms
            .saturating_mul(u64::from(self.current_attempt))
            .min(self.max_delay_ms);
        let delay_ms = self.apply_jitter(base_ms).min(self.max_delay_ms);

        self.current_attempt += 1;

        Some(Duration::from_millis(delay_ms))
    }

    /// Spread the delay over `[d * (1 - jitter), d * (1 + jitter)]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn apply_jitter(&self, delay_ms: u64) -> u64 {
        if self.jitter_factor <= 0.0 || delay_ms == 0 {
            return delay_ms;
        }
        let jitter_range = delay_ms as f64 * self.jitter_factor;
        let min = (delay_ms as f64 - jitter_range).max(0.0);
        let max = delay_ms as f64 + jitter_range;
        rand::rng().random_range(min..=max) as u64
    }

    /// Attempt number about to run (1-based).
    #[must_use]
    pub const fn current_attempt(&self) -> u32 {
        self.current_attempt
    }

    /// Check if more attempts are available.
    #[must_use]
    pub const fn has_remaining_attempts(&self) -> bool {
        self.current_attempt < self.max_attempts
    }
}

/// Error categories for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Error is retryable (transient failure).
    Retryable,
    /// Error is not retryable (permanent failure).
    NonRetryable,
}

/// Categorize an HTTP response status for retry decision.
#[must_use]
pub const fn categorize_status(status_code: u16) -> ErrorCategory {
    match status_code {
        500..=599 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Check if an HTTP status code is retryable.
#[must_use]
pub const fn is_retryable_status(status_code: u16) -> bool {
    matches!(categorize_status(status_code), ErrorCategory::Retryable)
}
