//! Static table of broker descriptors keyed by normalized name.

use std::collections::BTreeMap;

use thiserror::Error;

use super::config::{BrokerConfig, normalize_broker_name};
use super::template::TemplateError;
use crate::domain::trade::FieldMapping;

/// Reasons a broker table is rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A broker has a blank name.
    #[error("broker name must not be empty")]
    EmptyName,

    /// Two brokers normalize to the same key.
    #[error("duplicate broker '{0}'")]
    DuplicateBroker(String),

    /// Base URL is blank or not http(s).
    #[error("broker '{broker}' has invalid base_url '{base_url}'")]
    InvalidBaseUrl {
        /// Broker key.
        broker: String,
        /// Offending URL.
        base_url: String,
    },

    /// Endpoint does not start with `/`.
    #[error("broker '{broker}' has invalid {kind} endpoint '{endpoint}'")]
    InvalidEndpoint {
        /// Broker key.
        broker: String,
        /// `trades` or `refresh`.
        kind: &'static str,
        /// Offending endpoint.
        endpoint: String,
    },

    /// Refresh payload template is malformed.
    #[error("broker '{broker}' refresh payload: {source}")]
    Template {
        /// Broker key.
        broker: String,
        /// Underlying template error.
        source: TemplateError,
    },
}

/// Immutable set of broker descriptors.
#[derive(Debug, Clone, Default)]
pub struct BrokerConfigRegistry {
    brokers: BTreeMap<String, BrokerConfig>,
}

impl BrokerConfigRegistry {
    /// Build a registry, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns the first invalid or duplicate entry.
    pub fn new(configs: impl IntoIterator<Item = BrokerConfig>) -> Result<Self, RegistryError> {
        let mut brokers = BTreeMap::new();
        for config in configs {
            let key = config.key();
            validate(&key, &config)?;
            if brokers.insert(key.clone(), config).is_some() {
                return Err(RegistryError::DuplicateBroker(key));
            }
        }
        Ok(Self { brokers })
    }

    /// Look up a broker by name (case-insensitive, trimmed).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BrokerConfig> {
        self.brokers.get(&normalize_broker_name(name))
    }

    /// Field mapping for a broker.
    #[must_use]
    pub fn mapping(&self, name: &str) -> Option<&FieldMapping> {
        self.get(name).map(|c| &c.mapping)
    }

    /// Registered broker keys, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.brokers.keys().map(String::as_str)
    }

    /// All descriptors, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = &BrokerConfig> {
        self.brokers.values()
    }

    /// Number of registered brokers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.brokers.len()
    }

    /// Whether no brokers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brokers.is_empty()
    }
}

fn validate(key: &str, config: &BrokerConfig) -> Result<(), RegistryError> {
    if key.is_empty() {
        return Err(RegistryError::EmptyName);
    }

    let base_url = config.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(RegistryError::InvalidBaseUrl {
            broker: key.to_string(),
            base_url: config.base_url.clone(),
        });
    }

    for (kind, endpoint) in [
        ("trades", &config.endpoints.trades),
        ("refresh", &config.endpoints.refresh),
    ] {
        if !endpoint.starts_with('/') {
            return Err(RegistryError::InvalidEndpoint {
                broker: key.to_string(),
                kind,
                endpoint: endpoint.clone(),
            });
        }
    }

    config
        .refresh_payload
        .validate()
        .map_err(|source| RegistryError::Template {
            broker: key.to_string(),
            source,
        })
}
