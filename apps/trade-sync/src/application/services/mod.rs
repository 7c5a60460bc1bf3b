//! Application Services
//!
//! Shared stateful services used by the use cases.

mod token_cache;

pub use token_cache::TokenCache;
