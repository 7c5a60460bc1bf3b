//! Dependency Injection Container
//!
//! Builds one generic adapter per configured broker and wires them, the
//! token cache and the sync use case into the HTTP state.

use std::sync::Arc;

use axum::Router;

use crate::application::ports::SecretSource;
use crate::application::services::TokenCache;
use crate::application::use_cases::SyncTradesUseCase;
use crate::config::{Config, ConfigError};
use crate::domain::broker::BrokerConfigRegistry;
use crate::infrastructure::broker::{GenericAdapterConfig, GenericBrokerAdapter, GenericHttpError};
use crate::infrastructure::http::{AppState, create_router};
use crate::infrastructure::secrets::ProcessEnvSecrets;

/// Errors raised while wiring the application.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An adapter's HTTP client could not be built.
    #[error("failed to build adapter for '{broker}': {source}")]
    Adapter {
        /// Broker name.
        broker: String,
        /// Underlying client error.
        source: GenericHttpError,
    },
}

/// Dependency injection container.
///
/// Holds the shared registry, token cache and use case for the process
/// lifetime.
pub struct Container {
    registry: Arc<BrokerConfigRegistry>,
    tokens: Arc<TokenCache>,
    sync_trades: Arc<SyncTradesUseCase<GenericBrokerAdapter>>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("brokers", &self.registry.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Container {
    /// Wire the application from `config`, reading secrets from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid broker table or adapter client.
    pub fn new(config: &Config) -> Result<Self, ContainerError> {
        Self::with_secrets(config, Arc::new(ProcessEnvSecrets))
    }

    /// Wire the application with an explicit secret source.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid broker table or adapter client.
    pub fn with_secrets(
        config: &Config,
        secrets: Arc<dyn SecretSource>,
    ) -> Result<Self, ContainerError> {
        let registry = Arc::new(config.broker_registry()?);
        let adapter_config = adapter_config(config);

        let adapters = registry
            .iter()
            .map(|broker| {
                GenericBrokerAdapter::new(broker.clone(), &adapter_config, Arc::clone(&secrets))
                    .map(Arc::new)
                    .map_err(|source| ContainerError::Adapter {
                        broker: broker.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tokens = Arc::new(TokenCache::new(config.tokens.expiry_skew()));
        let sync_trades = Arc::new(SyncTradesUseCase::new(
            adapters,
            Arc::clone(&registry),
            Arc::clone(&tokens),
        ));

        tracing::info!(brokers = ?registry.names().collect::<Vec<_>>(), "Brokers registered");

        Ok(Self {
            registry,
            tokens,
            sync_trades,
        })
    }

    /// Broker registry.
    #[must_use]
    pub fn registry(&self) -> Arc<BrokerConfigRegistry> {
        Arc::clone(&self.registry)
    }

    /// Shared token cache.
    #[must_use]
    pub fn tokens(&self) -> Arc<TokenCache> {
        Arc::clone(&self.tokens)
    }

    /// Sync use case.
    #[must_use]
    pub fn sync_trades_use_case(&self) -> Arc<SyncTradesUseCase<GenericBrokerAdapter>> {
        Arc::clone(&self.sync_trades)
    }

    /// HTTP state for the router.
    #[must_use]
    pub fn app_state(&self) -> AppState<GenericBrokerAdapter> {
        AppState {
            sync_trades: Arc::clone(&self.sync_trades),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Fully wired HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(self.app_state())
    }
}

fn adapter_config(config: &Config) -> GenericAdapterConfig {
    let mut adapter = GenericAdapterConfig::default()
        .with_timeout(config.http_client.timeout())
        .with_retry(config.http_client.retry_policy())
        .with_default_token_lease(config.tokens.default_lease());
    if let Some(user_agent) = &config.http_client.user_agent {
        adapter = adapter.with_user_agent(user_agent.clone());
    }
    adapter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::StaticSecrets;
    use crate::config::{default_config, load_config_from_string};

    #[test]
    fn wires_builtin_brokers() {
        let container = Container::new(&default_config().unwrap()).unwrap();

        assert_eq!(container.registry().len(), 2);
        assert_eq!(
            container.sync_trades_use_case().brokers(),
            vec!["metatrader".to_string(), "zerodha".to_string()]
        );
        assert_eq!(container.tokens().expiry_skew().num_milliseconds(), 30_000);
    }

    #[test]
    fn applies_http_and_token_settings() {
        let config = load_config_from_string(
            r"
http_client:
  timeout_ms: 2500
  retry_attempts: 5
  user_agent: desk-sync/1.0
tokens:
  expiry_skew_ms: 1000
  default_lease_secs: 60
",
        )
        .unwrap();

        let adapter = adapter_config(&config);
        assert_eq!(adapter.timeout, std::time::Duration::from_millis(2500));
        assert_eq!(adapter.retry.max_attempts, 5);
        assert_eq!(adapter.user_agent, "desk-sync/1.0");
        assert_eq!(adapter.default_token_lease, std::time::Duration::from_secs(60));

        let container =
            Container::with_secrets(&config, Arc::new(StaticSecrets::new())).unwrap();
        assert_eq!(container.tokens().expiry_skew().num_milliseconds(), 1_000);
    }

    #[test]
    fn invalid_static_header_fails_wiring() {
        let config = load_config_from_string(
            r#"
brokers:
  - name: acme
    base_url: "https://acme.test"
    endpoints:
      trades: /fills
      refresh: /oauth/token
    headers:
      "Bad Header": "x"
    mapping:
      symbol: s
      quantity: q
      price: p
"#,
        )
        .unwrap();

        let err = Container::with_secrets(&config, Arc::new(StaticSecrets::new())).unwrap_err();
        assert!(matches!(err, ContainerError::Adapter { ref broker, .. } if broker == "acme"));
    }
}
