//! Token Cache
//!
//! In-memory store of per-user, per-broker credentials. Decides token
//! validity and refreshes through the broker port when a token is missing or
//! inside the expiry skew window.
//!
//! Refreshes are single-flight per `(user_id, broker)` key: concurrent
//! callers wait on a per-key async lock and re-check the cache once they hold
//! it, so only the first caller in an expiry window reaches the broker.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use parking_lot::{Mutex, RwLock};

use crate::application::ports::{BrokerError, BrokerPort};
use crate::domain::auth::{Token, default_expiry_skew, is_expired};
use crate::observability::record_token_refresh;

type FlightKey = (String, String);

/// Process-lifetime credential cache.
///
/// Per-key refresh locks live only while a refresh for that key is running
/// or awaited.
#[derive(Debug)]
pub struct TokenCache {
    tokens: RwLock<HashMap<String, HashMap<String, Token>>>,
    in_flight: Mutex<HashMap<FlightKey, Arc<tokio::sync::Mutex<()>>>>,
    expiry_skew: Duration,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(default_expiry_skew())
    }
}

impl TokenCache {
    /// Create an empty cache that treats tokens as expired `expiry_skew`
    /// before their stated expiry.
    #[must_use]
    pub fn new(expiry_skew: Duration) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            expiry_skew,
        }
    }

    /// Configured expiry skew.
    #[must_use]
    pub const fn expiry_skew(&self) -> Duration {
        self.expiry_skew
    }

    /// Cached token for `(user_id, broker)`, valid or not.
    #[must_use]
    pub fn get(&self, user_id: &str, broker: &str) -> Option<Token> {
        self.tokens
            .read()
            .get(user_id)
            .and_then(|per_broker| per_broker.get(broker))
            .cloned()
    }

    /// Store `token`, replacing any previous entry, and return it.
    pub fn set(&self, user_id: &str, broker: &str, token: Token) -> Token {
        self.tokens
            .write()
            .entry(user_id.to_string())
            .or_default()
            .insert(broker.to_string(), token.clone());
        token
    }

    /// Whether `token` needs refreshing under this cache's skew.
    #[must_use]
    pub fn is_expired(&self, token: Option<&Token>) -> bool {
        is_expired(token, self.expiry_skew)
    }

    /// Number of cached tokens across all users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.read().values().map(HashMap::len).sum()
    }

    /// Whether no token has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return a usable token, refreshing through `broker` when needed.
    ///
    /// The cached token is returned untouched while unexpired. Otherwise the
    /// broker's refresh is called with the previous token (or `None` on first
    /// use) and the result replaces the cache entry. Failed refreshes leave
    /// the cache unchanged.
    ///
    /// # Errors
    ///
    /// Returns the broker's error when the refresh fails.
    pub async fn get_valid_token<B>(
        &self,
        user_id: &str,
        broker_key: &str,
        broker: &B,
    ) -> Result<Token, BrokerError>
    where
        B: BrokerPort + ?Sized,
    {
        if let Some(token) = self.valid_cached(user_id, broker_key) {
            return Ok(token);
        }

        let flight = self.flight_lock(user_id, broker_key);
        let result = {
            let _guard = flight.lock().await;
            self.refresh_locked(user_id, broker_key, broker).await
        };
        self.release_flight(user_id, broker_key, &flight);
        result
    }

    /// Refresh under the per-key lock.
    async fn refresh_locked<B>(
        &self,
        user_id: &str,
        broker_key: &str,
        broker: &B,
    ) -> Result<Token, BrokerError>
    where
        B: BrokerPort + ?Sized,
    {
        // Another caller may have refreshed while we waited.
        if let Some(token) = self.valid_cached(user_id, broker_key) {
            return Ok(token);
        }

        let previous = self.get(user_id, broker_key);
        tracing::debug!(
            user_id,
            broker = broker.name(),
            had_token = previous.is_some(),
            "Refreshing broker token"
        );

        match broker.refresh_token(previous.as_ref()).await {
            Ok(token) => {
                record_token_refresh(broker.name(), "success");
                Ok(self.set(user_id, broker_key, token))
            }
            Err(e) => {
                record_token_refresh(broker.name(), "error");
                tracing::warn!(user_id, broker = broker.name(), error = %e, "Token refresh failed");
                Err(e)
            }
        }
    }

    fn valid_cached(&self, user_id: &str, broker: &str) -> Option<Token> {
        self.get(user_id, broker)
            .filter(|token| !self.is_expired(Some(token)))
    }

    fn flight_lock(&self, user_id: &str, broker: &str) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(
            self.in_flight
                .lock()
                .entry((user_id.to_string(), broker.to_string()))
                .or_default(),
        )
    }

    /// Drop the per-key lock once no other caller holds or waits on it.
    fn release_flight(&self, user_id: &str, broker: &str, flight: &Arc<tokio::sync::Mutex<()>>) {
        let mut in_flight = self.in_flight.lock();
        // One reference in the map, one held by the caller.
        if Arc::strong_count(flight) <= 2 {
            in_flight.remove(&(user_id.to_string(), broker.to_string()));
        }
    }
}
