//! Config-driven broker adapter implementing BrokerPort.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::application::ports::{BrokerError, BrokerPort, SecretSource};
use crate::domain::auth::Token;
use crate::domain::broker::BrokerConfig;
use crate::domain::trade::resolve_path;

use super::api_types::TokenResponse;
use super::config::GenericAdapterConfig;
use super::error::GenericHttpError;
use super::http_client::BrokerHttpClient;

/// One adapter per configured broker; behavior comes entirely from its
/// [`BrokerConfig`].
#[derive(Clone)]
pub struct GenericBrokerAdapter {
    config: BrokerConfig,
    client: BrokerHttpClient,
    secrets: Arc<dyn SecretSource>,
    default_token_lease: chrono::Duration,
}

impl std::fmt::Debug for GenericBrokerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericBrokerAdapter")
            .field("broker", &self.config.name)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl GenericBrokerAdapter {
    /// Create a new adapter for `config`.
    pub fn new(
        config: BrokerConfig,
        adapter_config: &GenericAdapterConfig,
        secrets: Arc<dyn SecretSource>,
    ) -> Result<Self, GenericHttpError> {
        let client = BrokerHttpClient::new(&config.name, &config.headers, adapter_config)?;
        let default_token_lease = chrono::Duration::from_std(adapter_config.default_token_lease)
            .unwrap_or_else(|_| chrono::Duration::minutes(20));

        Ok(Self {
            config,
            client,
            secrets,
            default_token_lease,
        })
    }

    /// Broker descriptor this adapter was built from.
    #[must_use]
    pub const fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Render the refresh payload for `previous`.
    fn refresh_payload(&self, previous: Option<&Token>) -> Result<Value, BrokerError> {
        let payload = self
            .config
            .refresh_payload
            .render(previous, |name| {
                let value = self.secrets.lookup(name);
                if value.is_none() {
                    tracing::warn!(
                        broker = %self.config.name,
                        variable = name,
                        "Refresh payload references unset variable"
                    );
                }
                value
            })
            .map_err(|e| BrokerError::TokenRefresh {
                broker: self.config.name.clone(),
                message: e.to_string(),
            })?;
        Ok(Value::Object(payload))
    }

    /// Pull the trades array out of a response body.
    fn extract_trades(&self, body: &Value) -> Result<Vec<Value>, BrokerError> {
        match resolve_path(body, &self.config.response_path) {
            Some(Value::Array(trades)) => Ok(trades.clone()),
            _ => Err(BrokerError::DataShape {
                broker: self.config.name.clone(),
                message: "Trades response is not an array at configured path".to_string(),
            }),
        }
    }
}

#[async_trait]
impl BrokerPort for GenericBrokerAdapter {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch_trades(&self, token: &Token) -> Result<Vec<Value>, BrokerError> {
        if !token.has_access_token() {
            return Err(BrokerError::MissingAccessToken {
                broker: self.config.name.clone(),
            });
        }

        let body = self
            .client
            .get(&self.config.trades_url(), &token.access_token)
            .await
            .map_err(|e| e.into_broker_error(&self.config.name))?;

        let trades = self.extract_trades(&body)?;
        tracing::debug!(
            broker = %self.config.name,
            count = trades.len(),
            "Fetched trades"
        );
        Ok(trades)
    }

    async fn refresh_token(&self, previous: Option<&Token>) -> Result<Token, BrokerError> {
        let payload = self.refresh_payload(previous)?;

        tracing::info!(broker = %self.config.name, "Refreshing token");

        let body = self
            .client
            .post(&self.config.refresh_url(), &payload)
            .await
            .map_err(|e| e.into_refresh_error(&self.config.name))?;

        let refresh_error = |message: String| BrokerError::TokenRefresh {
            broker: self.config.name.clone(),
            message,
        };

        serde_json::from_value::<TokenResponse>(body)
            .map_err(|e| refresh_error(format!("Unexpected token response: {e}")))?
            .into_token(previous, self.default_token_lease, Utc::now())
            .map_err(refresh_error)
    }
}
