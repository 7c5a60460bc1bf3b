//! Prometheus metrics for trade synchronization.
//!
//! Covers sync outcomes and latency, normalization volume, token refreshes,
//! broker request retries and malformed trade fields.
//!
//! # Example
//!
//! ```ignore
//! use trade_sync::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config)?;
//!
//! record_sync("zerodha", "success", 0.42);
//! ```

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // Broker round trips, from 10ms up to the 30s request timeout
            latency_buckets: vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Sync Metrics
// ============================================================================

/// Record a completed sync attempt.
///
/// # Arguments
///
/// * `broker` - Broker name (e.g., "zerodha", "metatrader")
/// * `status` - Outcome (`"success"` or `"error"`)
/// * `latency_seconds` - Wall time of the whole sync in seconds
pub fn record_sync(broker: &str, status: &str, latency_seconds: f64) {
    counter!(
        "trade_syncs_total",
        "broker" => broker.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "trade_sync_latency_seconds",
        "broker" => broker.to_string()
    )
    .record(latency_seconds);
}

/// Record the number of trades normalized in one sync.
pub fn record_trades_normalized(broker: &str, count: usize) {
    counter!("trades_normalized_total", "broker" => broker.to_string())
        .increment(u64::try_from(count).unwrap_or(u64::MAX));
}

/// Record a trade field that degraded to a sentinel value.
///
/// # Arguments
///
/// * `broker` - Broker name
/// * `field` - Canonical field name (`"quantity"`, `"price"`)
pub fn record_malformed_field(broker: &str, field: &str) {
    counter!(
        "malformed_trade_fields_total",
        "broker" => broker.to_string(),
        "field" => field.to_string()
    )
    .increment(1);
}

// ============================================================================
// Broker Metrics
// ============================================================================

/// Record a token refresh.
///
/// # Arguments
///
/// * `broker` - Broker name
/// * `outcome` - `"success"` or `"error"`
pub fn record_token_refresh(broker: &str, outcome: &str) {
    counter!(
        "token_refreshes_total",
        "broker" => broker.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a retried broker request.
pub fn record_broker_retry(broker: &str) {
    counter!("broker_request_retries_total", "broker" => broker.to_string()).increment(1);
}
