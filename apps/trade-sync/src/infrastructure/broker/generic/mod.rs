//! Generic Broker Adapter
//!
//! A single `BrokerPort` implementation that impersonates any broker from a
//! declarative [`BrokerConfig`](crate::domain::broker::BrokerConfig):
//! - Bearer-authenticated trade fetch with static per-broker headers
//! - Response extraction by dotted path
//! - Templated token refresh payloads
//! - Retry with linear backoff on transport and 5xx failures

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;

pub use adapter::GenericBrokerAdapter;
pub use config::{DEFAULT_TOKEN_LEASE, GenericAdapterConfig, default_user_agent};
pub use error::GenericHttpError;
pub use http_client::BrokerHttpClient;
