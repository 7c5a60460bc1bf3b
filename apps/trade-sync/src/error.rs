//! Error handling at the HTTP boundary.
//!
//! Every failure surfaces to clients as `{ "error": "<message>" }`. The
//! [`ErrorCode`] decides the status and is logged alongside the message.
//!
//! # HTTP Status Codes
//!
//! | Code | Status | Usage |
//! |------|--------|-------|
//! | `INVALID_REQUEST` | 400 | Missing or blank `userId` / `broker` |
//! | `UNKNOWN_BROKER` | 500 | No adapter registered under the name |
//! | `BROKER_CONFIG_MISSING` | 500 | Adapter without a config entry |
//! | `BROKER_API_ERROR` | 500 | Token refresh or trade fetch failed |
//! | `INVALID_TRADE_DATA` | 500 | A record could not be normalized |
//! | `INTERNAL_ERROR` | 500 | Anything else |

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::use_cases::SyncError;

/// Error codes for the HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Invalid request format or missing fields.
    InvalidRequest,
    /// Broker name not registered.
    UnknownBroker,
    /// Broker registered without configuration.
    BrokerConfigMissing,
    /// Broker API call failed.
    BrokerApiError,
    /// Broker returned unusable trade data.
    InvalidTradeData,
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// HTTP status for this error.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::UnknownBroker
            | Self::BrokerConfigMissing
            | Self::BrokerApiError
            | Self::InvalidTradeData
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::UnknownBroker => "UNKNOWN_BROKER",
            Self::BrokerConfigMissing => "BROKER_CONFIG_MISSING",
            Self::BrokerApiError => "BROKER_API_ERROR",
            Self::InvalidTradeData => "INVALID_TRADE_DATA",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// An API error with a code and client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Missing or blank sync request fields.
    #[must_use]
    pub fn missing_sync_fields() -> Self {
        Self::new(
            ErrorCode::InvalidRequest,
            "Missing required fields: userId, broker",
        )
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        let code = match &err {
            SyncError::UnknownBroker(_) => ErrorCode::UnknownBroker,
            SyncError::MissingConfig(_) => ErrorCode::BrokerConfigMissing,
            SyncError::Broker(_) => ErrorCode::BrokerApiError,
            SyncError::InvalidTrade { .. } => ErrorCode::InvalidTradeData,
        };
        Self::new(code, err.to_string())
    }
}

/// HTTP error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, error = %self.message, "Request failed");
        } else {
            tracing::debug!(code = %self.code, error = %self.message, "Request rejected");
        }
        (status, Json(ErrorResponse { error: self.message })).into_response()
    }
}
