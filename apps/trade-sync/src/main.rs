//! Trade Sync Binary
//!
//! Starts the trade sync HTTP service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin trade-sync
//! ```
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TRADE_SYNC_CONFIG`: Path to a YAML config file (default: built-in brokers)
//! - `PORT`: HTTP server port (default: 3000)
//! - `METATRADER_BASE_URL`, `ZERODHA_BASE_URL`: Broker base URL overrides
//! - `METATRADER_CLIENT_ID`, `METATRADER_CLIENT_SECRET`: MetaTrader refresh credentials
//! - `ZERODHA_API_KEY`, `ZERODHA_API_SECRET`: Zerodha refresh credentials
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use trade_sync::config::{Config, load_from_env};
use trade_sync::infrastructure::config::Container;
use trade_sync::observability::{MetricsConfig, init_metrics};
use trade_sync::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = load_from_env()
        .and_then(|c| c.with_port_override(std::env::var("PORT").ok().as_deref()))
        .context("failed to load configuration")?;

    init_tracing(&config.observability.logging).context("failed to initialize tracing")?;

    tracing::info!("Starting Trade Sync");
    log_config(&config);

    if config.observability.metrics.enabled {
        start_metrics(&config)?;
    }

    let container = Container::new(&config).context("failed to wire application")?;
    let app = container.router();

    let addr: SocketAddr = config
        .server
        .listen_addr()
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.server.listen_addr()))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Trade Sync stopped");
    Ok(())
}

fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

fn log_config(config: &Config) {
    tracing::info!(
        http_port = config.server.http_port,
        brokers = config.brokers.len(),
        retry_attempts = config.http_client.retry_attempts,
        timeout_ms = config.http_client.timeout_ms,
        expiry_skew_ms = config.tokens.expiry_skew_ms,
        "Configuration loaded"
    );
}

fn start_metrics(config: &Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .observability
        .metrics
        .listen_addr
        .parse()
        .context("invalid metrics listen address")?;
    init_metrics(&MetricsConfig::with_addr(addr)).context("failed to start metrics exporter")?;
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
