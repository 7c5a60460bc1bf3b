//! Tracing Setup
//!
//! Initializes the global `tracing` subscriber from [`LoggingConfig`].
//!
//! # Configuration
//!
//! - `observability.logging.level`: default filter (e.g. `info`, `trade_sync=debug`)
//! - `observability.logging.format`: `pretty` for development, `json` for log shippers
//! - `RUST_LOG`: overrides the configured level when set
//!
//! # Usage
//!
//! ```rust,ignore
//! use trade_sync::config::LoggingConfig;
//! use trade_sync::telemetry::init_tracing;
//!
//! init_tracing(&LoggingConfig::default())?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Tracing initialization errors.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log level '{level}': {message}")]
    InvalidLevel {
        /// Configured level.
        level: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Build the filter: `RUST_LOG` when set, else the configured level.
///
/// # Errors
///
/// Returns an error if the configured level does not parse.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::InvalidLevel {
        level: config.level.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error for an invalid level or if a subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;

    let result = if config.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    result.map_err(|e| TelemetryError::Install(e.to_string()))?;

    tracing::debug!(format = %config.format, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_directive_levels() {
        let config = LoggingConfig {
            level: "warn,trade_sync=debug".to_string(),
            format: "json".to_string(),
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn rejects_garbage_level() {
        // Only meaningful when RUST_LOG is not set by the test runner.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "trade_sync=[".to_string(),
            format: "pretty".to_string(),
        };
        assert!(matches!(
            build_filter(&config),
            Err(TelemetryError::InvalidLevel { .. })
        ));
    }
}
