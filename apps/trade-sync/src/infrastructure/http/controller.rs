//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to the sync use case.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};

use crate::application::ports::BrokerPort;
use crate::application::use_cases::SyncTradesUseCase;
use crate::error::ApiError;

use super::request::SyncRequest;
use super::response::{BrokersResponse, HealthResponse, SyncResponse};

/// Application state shared across handlers.
pub struct AppState<B>
where
    B: BrokerPort + ?Sized,
{
    /// Use case for syncing trades.
    pub sync_trades: Arc<SyncTradesUseCase<B>>,
    /// Application version.
    pub version: String,
}

impl<B> Clone for AppState<B>
where
    B: BrokerPort + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            sync_trades: Arc::clone(&self.sync_trades),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<B>(state: AppState<B>) -> Router
where
    B: BrokerPort + ?Sized + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/brokers", get(list_brokers))
        .route("/api/v1/sync", post(sync_trades))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check<B>(State(state): State<AppState<B>>) -> impl IntoResponse
where
    B: BrokerPort + ?Sized,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Registered broker names.
async fn list_brokers<B>(State(state): State<AppState<B>>) -> impl IntoResponse
where
    B: BrokerPort + ?Sized,
{
    Json(BrokersResponse {
        brokers: state.sync_trades.brokers(),
    })
}

/// Sync trades endpoint.
async fn sync_trades<B>(
    State(state): State<AppState<B>>,
    body: Bytes,
) -> Result<Json<SyncResponse>, ApiError>
where
    B: BrokerPort + ?Sized,
{
    let (user_id, broker) = SyncRequest::parse(&body)?;

    let trades = state.sync_trades.execute(&user_id, &broker).await?;

    Ok(Json(SyncResponse {
        user_id,
        broker,
        count: trades.len(),
        trades,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::BrokerError;
    use crate::application::services::TokenCache;
    use crate::domain::auth::Token;
    use crate::domain::broker::{BrokerConfig, BrokerConfigRegistry, Endpoints, RefreshTemplate};
    use crate::domain::trade::FieldMapping;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    // Mock broker
    struct MockBroker {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl BrokerPort for MockBroker {
        fn name(&self) -> &str {
            "metatrader"
        }

        async fn fetch_trades(&self, _token: &Token) -> Result<Vec<Value>, BrokerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BrokerError::Transport {
                    broker: "metatrader".to_string(),
                    message: "No response received from broker API".to_string(),
                });
            }
            Ok(vec![json!({
                "trade": {"sym": "EURUSD", "volume": "1.5", "price": 1.0845, "time": 1_756_893_600_000_i64, "type": "sell"}
            })])
        }

        async fn refresh_token(&self, _previous: Option<&Token>) -> Result<Token, BrokerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Token::new("a", "r", Utc::now() + Duration::hours(1)))
        }
    }

    fn metatrader_config() -> BrokerConfig {
        BrokerConfig {
            name: "metatrader".to_string(),
            base_url: "https://mt.test".to_string(),
            endpoints: Endpoints {
                trades: "/api/trades".to_string(),
                refresh: "/api/auth/refresh".to_string(),
            },
            response_path: String::new(),
            headers: BTreeMap::new(),
            mapping: FieldMapping {
                symbol: "trade.sym".to_string(),
                quantity: "trade.volume".to_string(),
                price: "trade.price".to_string(),
                timestamp: "trade.time".to_string(),
                side: "trade.type".to_string(),
            },
            refresh_payload: RefreshTemplate::default(),
        }
    }

    fn create_test_state(fail: bool) -> (AppState<MockBroker>, Arc<MockBroker>) {
        let broker = Arc::new(MockBroker {
            calls: AtomicUsize::new(0),
            fail,
        });
        let registry = Arc::new(BrokerConfigRegistry::new([metatrader_config()]).unwrap());
        let sync_trades = Arc::new(SyncTradesUseCase::new(
            [Arc::clone(&broker)],
            registry,
            Arc::new(TokenCache::default()),
        ));
        (
            AppState {
                sync_trades,
                version: "0.1.0-test".to_string(),
            },
            broker,
        )
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn sync_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/sync")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (state, _) = create_test_state(false);
        let router = create_router(state);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy", "version": "0.1.0-test"}));
    }

    #[tokio::test]
    async fn test_list_brokers() {
        let (state, _) = create_test_state(false);
        let router = create_router(state);

        let request = Request::builder()
            .uri("/api/v1/brokers")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"brokers": ["metatrader"]}));
    }

    #[tokio::test]
    async fn test_sync_returns_canonical_trades() {
        let (state, _) = create_test_state(false);
        let router = create_router(state);

        let (status, body) = send(
            router,
            sync_request(r#"{"userId": " demo-user-1 ", "broker": "MetaTrader"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "userId": "demo-user-1",
                "broker": "MetaTrader",
                "count": 1,
                "trades": [{
                    "symbol": "EURUSD",
                    "quantity": 1.5,
                    "price": 1.0845,
                    "timestamp": "2025-09-03T10:00:00.000Z",
                    "side": "SELL"
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_sync_missing_fields_is_bad_request() {
        let (state, broker) = create_test_state(false);
        let router = create_router(state);

        let (status, body) = send(router, sync_request(r#"{"userId": "u1"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing required fields: userId, broker"}));
        assert_eq!(broker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sync_malformed_body_is_bad_request() {
        let (state, _) = create_test_state(false);
        let router = create_router(state);

        let (status, _) = send(router, sync_request("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sync_unknown_broker_is_internal_error() {
        let (state, broker) = create_test_state(false);
        let router = create_router(state);

        let (status, body) = send(
            router,
            sync_request(r#"{"userId": "u1", "broker": "unknownbroker"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Unknown broker adapter: unknownbroker"}));
        assert_eq!(broker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sync_broker_failure_is_internal_error() {
        let (state, _) = create_test_state(true);
        let router = create_router(state);

        let (status, body) = send(
            router,
            sync_request(r#"{"userId": "u1", "broker": "metatrader"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "metatrader API Error: No response received from broker API (NETWORK_ERROR)"
        );
    }
}
