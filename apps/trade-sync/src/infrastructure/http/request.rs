//! HTTP request DTOs.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Body of `POST /api/v1/sync`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncRequest {
    /// User whose trades to sync.
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    /// Broker name.
    #[serde(default)]
    pub broker: Option<String>,
}

impl SyncRequest {
    /// Parse a raw body. Malformed JSON or wrongly typed fields are treated
    /// the same as missing fields.
    pub fn parse(body: &[u8]) -> Result<(String, String), ApiError> {
        serde_json::from_slice::<Self>(body)
            .map_err(|_| ApiError::missing_sync_fields())?
            .validated()
    }

    /// Trimmed `(user_id, broker)`, both non-empty.
    pub fn validated(self) -> Result<(String, String), ApiError> {
        let trimmed = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        match (trimmed(self.user_id), trimmed(self.broker)) {
            (Some(user_id), Some(broker)) => Ok((user_id, broker)),
            _ => Err(ApiError::missing_sync_fields()),
        }
    }
}
