//! Broker Port (Driven Port)
//!
//! Interface for fetching executed trades and refreshing credentials at a
//! brokerage.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::auth::Token;

/// Broker port error.
///
/// Every variant carries the broker name so failures stay traceable once
/// they reach the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// Token was missing or had no access credential.
    #[error("{broker}: Missing access token")]
    MissingAccessToken {
        /// Broker name.
        broker: String,
    },

    /// No response was received.
    #[error("{broker} API Error: {message} (NETWORK_ERROR)")]
    Transport {
        /// Broker name.
        broker: String,
        /// Transport failure details.
        message: String,
    },

    /// Non-2xx response.
    #[error("{broker} API Error: {message} ({code})")]
    Http {
        /// Broker name.
        broker: String,
        /// HTTP status code.
        status: u16,
        /// Broker-supplied code, or `HTTP_<status>`.
        code: String,
        /// Broker-supplied message, or a generic one.
        message: String,
    },

    /// Response body did not have the configured shape.
    #[error("{broker}: {message}")]
    DataShape {
        /// Broker name.
        broker: String,
        /// What was wrong with the response.
        message: String,
    },

    /// Refresh request could not be built or its response was unusable.
    #[error("{broker} Token Refresh Error: {message}")]
    TokenRefresh {
        /// Broker name.
        broker: String,
        /// Failure details.
        message: String,
    },
}

impl BrokerError {
    /// Broker the error originated from.
    #[must_use]
    pub fn broker(&self) -> &str {
        match self {
            Self::MissingAccessToken { broker }
            | Self::Transport { broker, .. }
            | Self::Http { broker, .. }
            | Self::DataShape { broker, .. }
            | Self::TokenRefresh { broker, .. } => broker,
        }
    }
}

/// Port for broker interactions.
#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Registry name of this broker.
    fn name(&self) -> &str;

    /// Fetch raw, broker-native trade records.
    async fn fetch_trades(&self, token: &Token) -> Result<Vec<Value>, BrokerError>;

    /// Obtain a new token, chaining from `previous` when one exists.
    async fn refresh_token(&self, previous: Option<&Token>) -> Result<Token, BrokerError>;
}
