//! Broker credential lifecycle.

pub mod token;

pub use token::{DEFAULT_EXPIRY_SKEW_MS, Token, default_expiry_skew, is_expired, is_expired_at};
