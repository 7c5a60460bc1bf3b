//! HTTP response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::trade::Trade;

/// Response from a successful sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    /// User whose trades were synced.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Broker name as requested.
    pub broker: String,
    /// Number of trades.
    pub count: usize,
    /// Canonical trades.
    pub trades: Vec<Trade>,
}

/// Registered brokers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokersResponse {
    /// Broker names, sorted.
    pub brokers: Vec<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}
