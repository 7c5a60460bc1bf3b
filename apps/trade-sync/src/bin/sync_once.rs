//! One-shot trade sync.
//!
//! Runs a single sync through the configured brokers and prints the
//! normalized trades as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sync-once -- [user_id] [broker]
//! ```
//!
//! Defaults to `demo-user-1` and `zerodha`. Honors `TRADE_SYNC_CONFIG` and
//! the broker environment variables used by the server.

use anyhow::Context;
use trade_sync::config::load_from_env;
use trade_sync::infrastructure::config::Container;
use trade_sync::telemetry::init_tracing;

const DEFAULT_USER_ID: &str = "demo-user-1";
const DEFAULT_BROKER: &str = "zerodha";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let mut args = std::env::args().skip(1);
    let user_id = args.next().unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    let broker = args.next().unwrap_or_else(|| DEFAULT_BROKER.to_string());

    let config = load_from_env().context("failed to load configuration")?;
    init_tracing(&config.observability.logging).context("failed to initialize tracing")?;

    let container = Container::new(&config).context("failed to wire application")?;
    let trades = container
        .sync_trades_use_case()
        .execute(&user_id, &broker)
        .await
        .with_context(|| format!("sync failed for {user_id} on {broker}"))?;

    println!("{}", serde_json::to_string_pretty(&trades)?);
    Ok(())
}
