//! Application Ports (Driven)
//!
//! Ports define interfaces for interacting with external systems.

mod broker_port;
mod secret_source_port;

pub use broker_port::{BrokerError, BrokerPort};
pub use secret_source_port::{SecretSource, StaticSecrets};
