//! Generic adapter error types.

use thiserror::Error;

use crate::application::ports::BrokerError;

/// Errors from the generic HTTP client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenericHttpError {
    /// No response was received, after all retries.
    #[error("Network error: {0}")]
    Network(String),

    /// Broker answered with a non-2xx status.
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Broker-supplied code, or `HTTP_<status>`.
        code: String,
        /// Broker-supplied message, or `HTTP <status> Error`.
        message: String,
    },

    /// Successful response with a body that is not JSON.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// A configured header name or value is not valid HTTP.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// Header name as configured.
        name: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl GenericHttpError {
    /// Broker-qualified error for a trade fetch.
    #[must_use]
    pub fn into_broker_error(self, broker: &str) -> BrokerError {
        let broker = broker.to_string();
        match self {
            Self::Network(message) => BrokerError::Transport { broker, message },
            Self::Api {
                status,
                code,
                message,
            } => BrokerError::Http {
                broker,
                status,
                code,
                message,
            },
            Self::JsonParse(message) => BrokerError::DataShape { broker, message },
            Self::InvalidHeader { .. } | Self::Client(_) => BrokerError::Transport {
                broker,
                message: self.to_string(),
            },
        }
    }

    /// Broker-qualified error for a token refresh.
    #[must_use]
    pub fn into_refresh_error(self, broker: &str) -> BrokerError {
        let message = match self {
            Self::Api { code, message, .. } => format!("{message} ({code})"),
            Self::Network(message) => format!("{message} (NETWORK_ERROR)"),
            other => other.to_string(),
        };
        BrokerError::TokenRefresh {
            broker: broker.to_string(),
            message,
        }
    }
}
