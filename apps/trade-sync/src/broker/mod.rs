//! Broker resilience patterns.
//!
//! Retry policy and backoff shared by every broker adapter.

mod retry;

pub use retry::{
    ErrorCategory, LinearBackoff, RetryPolicy, categorize_status, is_retryable_status,
};
