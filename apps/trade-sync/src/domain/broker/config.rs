//! Per-broker connection and mapping descriptors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::template::RefreshTemplate;
use crate::domain::trade::FieldMapping;

/// Broker API endpoints, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Executed-trades listing (GET).
    pub trades: String,
    /// Token refresh (POST).
    pub refresh: String,
}

/// Everything needed to talk to one broker through the generic client.
///
/// Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Registry key, matched case-insensitively.
    pub name: String,
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    /// API endpoints.
    pub endpoints: Endpoints,
    /// Dotted path to the trades array in the response; empty means the
    /// body itself is the array.
    #[serde(default)]
    pub response_path: String,
    /// Static headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Field mapping for raw trade records.
    pub mapping: FieldMapping,
    /// Refresh request payload template.
    #[serde(default)]
    pub refresh_payload: RefreshTemplate,
}

impl BrokerConfig {
    /// Normalized registry key for this broker.
    #[must_use]
    pub fn key(&self) -> String {
        normalize_broker_name(&self.name)
    }

    /// Absolute URL of the trades endpoint.
    #[must_use]
    pub fn trades_url(&self) -> String {
        join_url(&self.base_url, &self.endpoints.trades)
    }

    /// Absolute URL of the refresh endpoint.
    #[must_use]
    pub fn refresh_url(&self) -> String {
        join_url(&self.base_url, &self.endpoints.refresh)
    }
}

/// Lowercase, trimmed broker name used for lookups.
#[must_use]
pub fn normalize_broker_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> BrokerConfig {
        BrokerConfig {
            name: " MetaTrader ".to_string(),
            base_url: base_url.to_string(),
            endpoints: Endpoints {
                trades: "/v1/trades".to_string(),
                refresh: "/v1/auth/refresh".to_string(),
            },
            response_path: String::new(),
            headers: BTreeMap::new(),
            mapping: FieldMapping::default(),
            refresh_payload: RefreshTemplate::default(),
        }
    }

    #[test]
    fn key_is_normalized() {
        assert_eq!(config("https://api.metatrader.com").key(), "metatrader");
    }

    #[test]
    fn urls_join_base_and_endpoint() {
        let cfg = config("https://api.metatrader.com/");
        assert_eq!(cfg.trades_url(), "https://api.metatrader.com/v1/trades");
        assert_eq!(cfg.refresh_url(), "https://api.metatrader.com/v1/auth/refresh");
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = serde_json::json!({
            "name": "zerodha",
            "base_url": "https://api.kite.trade",
            "endpoints": {"trades": "/portfolio/positions", "refresh": "/session/refresh_token"},
            "mapping": {"symbol": "tradingsymbol", "quantity": "quantity", "price": "average_price"}
        });

        let cfg: BrokerConfig = serde_json::from_value(json).unwrap();

        assert!(cfg.response_path.is_empty());
        assert!(cfg.headers.is_empty());
        assert!(cfg.refresh_payload.is_empty());
        assert!(cfg.mapping.timestamp.is_empty());
        assert!(cfg.mapping.side.is_empty());
    }
}
