//! Broker descriptors: connection details, field mappings and refresh
//! templates. Broker-specific behavior lives here as data.

pub mod config;
pub mod registry;
pub mod template;

pub use config::{BrokerConfig, Endpoints, normalize_broker_name};
pub use registry::{BrokerConfigRegistry, RegistryError};
pub use template::{Placeholder, RefreshTemplate, TemplateError, TokenField};
