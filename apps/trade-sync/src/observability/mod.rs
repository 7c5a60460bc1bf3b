//! Observability module for metrics.
//!
//! Prometheus metrics for broker syncs. Logging is configured in
//! [`crate::telemetry`].

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_broker_retry, record_malformed_field,
    record_sync, record_token_refresh, record_trades_normalized,
};
