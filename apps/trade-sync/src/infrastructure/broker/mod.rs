//! Broker Adapters
//!
//! Implementations of `BrokerPort`.

pub mod generic;

pub use generic::{GenericAdapterConfig, GenericBrokerAdapter, GenericHttpError};
