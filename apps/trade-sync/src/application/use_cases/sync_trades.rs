//! Sync Trades Use Case
//!
//! Resolve broker → obtain a valid token → fetch raw trades → normalize.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::application::ports::{BrokerError, BrokerPort};
use crate::application::services::TokenCache;
use crate::domain::broker::{BrokerConfigRegistry, normalize_broker_name};
use crate::domain::trade::{Trade, TradeError};
use crate::observability::{record_malformed_field, record_sync, record_trades_normalized};

/// Errors that abort a sync. A sync never returns partial results.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No adapter is registered under the requested name.
    #[error("Unknown broker adapter: {0}")]
    UnknownBroker(String),

    /// An adapter exists but its configuration does not.
    #[error("No dynamic config found for broker {0}")]
    MissingConfig(String),

    /// Token refresh or trade fetch failed.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// A record could not be turned into a canonical trade.
    #[error("{broker}: record {index}: {source}")]
    InvalidTrade {
        /// Broker name.
        broker: String,
        /// Position of the record in the broker response.
        index: usize,
        /// Underlying conversion error.
        source: TradeError,
    },
}

/// Use case for synchronizing a user's trades from one broker.
pub struct SyncTradesUseCase<B>
where
    B: BrokerPort + ?Sized,
{
    adapters: HashMap<String, Arc<B>>,
    registry: Arc<BrokerConfigRegistry>,
    tokens: Arc<TokenCache>,
}

impl<B> SyncTradesUseCase<B>
where
    B: BrokerPort + ?Sized,
{
    /// Create a new `SyncTradesUseCase`.
    ///
    /// Adapters are keyed by their lowercased name.
    pub fn new(
        adapters: impl IntoIterator<Item = Arc<B>>,
        registry: Arc<BrokerConfigRegistry>,
        tokens: Arc<TokenCache>,
    ) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (normalize_broker_name(adapter.name()), adapter))
            .collect();
        Self {
            adapters,
            registry,
            tokens,
        }
    }

    /// Registered broker names, sorted.
    #[must_use]
    pub fn brokers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Shared token cache.
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Sync all trades for `user_id` from `broker`.
    ///
    /// # Errors
    ///
    /// Fails when the broker is unknown or unconfigured, when token refresh
    /// or the trade fetch fails, or when any record has an invalid timestamp.
    pub async fn execute(&self, user_id: &str, broker: &str) -> Result<Vec<Trade>, SyncError> {
        let span = tracing::info_span!(
            "sync_trades",
            sync_id = %uuid::Uuid::new_v4(),
            user_id,
            broker
        );

        async {
            let started = Instant::now();
            let result = self.sync(user_id, broker).await;
            let status = if result.is_ok() { "success" } else { "error" };
            record_sync(
                &normalize_broker_name(broker),
                status,
                started.elapsed().as_secs_f64(),
            );

            match &result {
                Ok(trades) => tracing::info!(count = trades.len(), "Trades synced"),
                Err(e) => tracing::error!(error = %e, "Trade sync failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn sync(&self, user_id: &str, broker: &str) -> Result<Vec<Trade>, SyncError> {
        let key = normalize_broker_name(broker);
        let adapter = self
            .adapters
            .get(&key)
            .ok_or_else(|| SyncError::UnknownBroker(broker.to_string()))?;

        let mapping = self
            .registry
            .mapping(&key)
            .ok_or_else(|| SyncError::MissingConfig(adapter.name().to_string()))?;

        let token = self
            .tokens
            .get_valid_token(user_id, &key, adapter.as_ref())
            .await?;
        let raw_trades = adapter.fetch_trades(&token).await?;
        tracing::debug!(raw = raw_trades.len(), "Fetched raw trades");

        let mut trades = Vec::with_capacity(raw_trades.len());
        for (index, raw) in raw_trades.iter().enumerate() {
            let normalized = mapping.normalize(raw);
            for field in normalized.malformed_fields() {
                record_malformed_field(&key, field);
                tracing::warn!(index, field, symbol = %normalized.symbol, "Non-numeric trade field");
            }

            let trade = Trade::try_from(normalized).map_err(|source| SyncError::InvalidTrade {
                broker: adapter.name().to_string(),
                index,
                source,
            })?;
            trades.push(trade);
        }

        record_trades_normalized(&key, trades.len());
        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Token;
    use crate::domain::broker::{BrokerConfig, Endpoints, RefreshTemplate};
    use crate::domain::trade::{FieldMapping, TradeSide};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockBroker {
        name: String,
        trades: Vec<Value>,
        refreshes: AtomicUsize,
        fetches: AtomicUsize,
        fail_fetch: bool,
    }

    impl MockBroker {
        fn new(name: &str, trades: Vec<Value>) -> Self {
            Self {
                name: name.to_string(),
                trades,
                refreshes: AtomicUsize::new(0),
                fetches: AtomicUsize::new(0),
                fail_fetch: false,
            }
        }

        fn calls(&self) -> usize {
            self.refreshes.load(Ordering::SeqCst) + self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BrokerPort for MockBroker {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_trades(&self, token: &Token) -> Result<Vec<Value>, BrokerError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch {
                return Err(BrokerError::Http {
                    broker: self.name.clone(),
                    status: 403,
                    code: "HTTP_403".to_string(),
                    message: "HTTP 403 Error".to_string(),
                });
            }
            assert_eq!(token.access_token, "access");
            Ok(self.trades.clone())
        }

        async fn refresh_token(&self, _previous: Option<&Token>) -> Result<Token, BrokerError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(Token::new("access", "refresh", Utc::now() + Duration::hours(1)))
        }
    }

    fn config(name: &str, mapping: FieldMapping) -> BrokerConfig {
        BrokerConfig {
            name: name.to_string(),
            base_url: "https://broker.test".to_string(),
            endpoints: Endpoints {
                trades: "/trades".to_string(),
                refresh: "/refresh".to_string(),
            },
            response_path: String::new(),
            headers: BTreeMap::new(),
            mapping,
            refresh_payload: RefreshTemplate::default(),
        }
    }

    fn zerodha_mapping() -> FieldMapping {
        FieldMapping {
            symbol: "tradingsymbol".to_string(),
            quantity: "quantity".to_string(),
            price: "average_price".to_string(),
            timestamp: String::new(),
            side: String::new(),
        }
    }

    fn use_case(
        broker: Arc<MockBroker>,
        configs: Vec<BrokerConfig>,
    ) -> SyncTradesUseCase<MockBroker> {
        SyncTradesUseCase::new(
            [broker],
            Arc::new(BrokerConfigRegistry::new(configs).unwrap()),
            Arc::new(TokenCache::default()),
        )
    }

    #[tokio::test]
    async fn test_unknown_broker_makes_no_calls() {
        let broker = Arc::new(MockBroker::new("zerodha", vec![]));
        let uc = use_case(Arc::clone(&broker), vec![config("zerodha", zerodha_mapping())]);

        let err = uc.execute("u1", "unknownbroker").await.unwrap_err();

        assert!(matches!(err, SyncError::UnknownBroker(ref name) if name == "unknownbroker"));
        assert_eq!(err.to_string(), "Unknown broker adapter: unknownbroker");
        assert_eq!(broker.calls(), 0);
    }

    #[tokio::test]
    async fn test_adapter_without_config_fails() {
        let broker = Arc::new(MockBroker::new("zerodha", vec![]));
        let uc = use_case(Arc::clone(&broker), vec![]);

        let err = uc.execute("u1", "zerodha").await.unwrap_err();

        assert!(matches!(err, SyncError::MissingConfig(_)));
        assert_eq!(broker.calls(), 0);
    }

    #[tokio::test]
    async fn test_sync_normalizes_every_record() {
        let broker = Arc::new(MockBroker::new(
            "zerodha",
            vec![
                json!({"tradingsymbol": "INFY", "quantity": 10, "average_price": 1500}),
                json!({"tradingsymbol": "TCS", "quantity": -5, "average_price": "3200.5"}),
            ],
        ));
        let uc = use_case(broker, vec![config("zerodha", zerodha_mapping())]);

        let trades = uc.execute("u1", "zerodha").await.unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].symbol, "INFY");
        assert_eq!(trades[0].side, TradeSide::Buy);
        assert_eq!(trades[1].symbol, "TCS");
        assert!((trades[1].price - 3200.5).abs() < f64::EPSILON);
        assert_eq!(trades[1].side, TradeSide::Sell);
    }

    #[tokio::test]
    async fn test_broker_lookup_is_case_insensitive() {
        let broker = Arc::new(MockBroker::new("Zerodha", vec![]));
        let uc = use_case(broker, vec![config("zerodha", zerodha_mapping())]);

        assert!(uc.execute("u1", "  ZERODHA ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_token_is_reused_across_syncs() {
        let broker = Arc::new(MockBroker::new("zerodha", vec![]));
        let uc = use_case(Arc::clone(&broker), vec![config("zerodha", zerodha_mapping())]);

        uc.execute("u1", "zerodha").await.unwrap();
        uc.execute("u1", "zerodha").await.unwrap();

        assert_eq!(broker.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(broker.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(uc.tokens().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_broker_qualified() {
        let mut mock = MockBroker::new("zerodha", vec![]);
        mock.fail_fetch = true;
        let uc = use_case(Arc::new(mock), vec![config("zerodha", zerodha_mapping())]);

        let err = uc.execute("u1", "zerodha").await.unwrap_err();

        assert!(matches!(err, SyncError::Broker(BrokerError::Http { status: 403, .. })));
        assert_eq!(err.to_string(), "zerodha API Error: HTTP 403 Error (HTTP_403)");
    }

    #[tokio::test]
    async fn test_invalid_timestamp_fails_whole_sync() {
        let mapping = FieldMapping {
            timestamp: "time".to_string(),
            ..zerodha_mapping()
        };
        let broker = Arc::new(MockBroker::new(
            "zerodha",
            vec![
                json!({"tradingsymbol": "INFY", "quantity": 1, "average_price": 1, "time": "2025-09-03T10:00:00Z"}),
                json!({"tradingsymbol": "TCS", "quantity": 1, "average_price": 1, "time": "yesterday"}),
            ],
        ));
        let uc = use_case(broker, vec![config("zerodha", mapping)]);

        let err = uc.execute("u1", "zerodha").await.unwrap_err();

        assert!(matches!(err, SyncError::InvalidTrade { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_non_numeric_fields_do_not_fail_sync() {
        let broker = Arc::new(MockBroker::new(
            "zerodha",
            vec![json!({"tradingsymbol": "INFY", "quantity": "ten", "average_price": 1500})],
        ));
        let uc = use_case(broker, vec![config("zerodha", zerodha_mapping())]);

        let trades = uc.execute("u1", "zerodha").await.unwrap();

        assert!(trades[0].quantity.is_nan());
        assert_eq!(trades[0].side, TradeSide::Buy);
    }

    #[test]
    fn test_brokers_are_sorted() {
        let registry = Arc::new(BrokerConfigRegistry::default());
        let uc = SyncTradesUseCase::new(
            [
                Arc::new(MockBroker::new("zerodha", vec![])),
                Arc::new(MockBroker::new("MetaTrader", vec![])),
            ],
            registry,
            Arc::new(TokenCache::default()),
        );

        assert_eq!(uc.brokers(), vec!["metatrader", "zerodha"]);
    }
}
