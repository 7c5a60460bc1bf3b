//! Configuration module for the trade sync service.
//!
//! Loads YAML configuration with `${VAR}` / `${VAR:-default}` environment
//! interpolation, fills in the built-in broker table when none is given, and
//! validates the result.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trade_sync::config::{default_config, load_config};
//!
//! // Built-in defaults (metatrader + zerodha)
//! let config = default_config()?;
//!
//! // From a file
//! let config = load_config("trade-sync.yaml")?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod brokers;
mod http_client;
mod observability;
mod server;
mod tokens;

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::broker::{BrokerConfig, BrokerConfigRegistry};

pub use brokers::BUILTIN_BROKERS_YAML;
pub use http_client::HttpClientConfig;
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use server::ServerConfig;
pub use tokens::TokensConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "TRADE_SYNC_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Outbound broker HTTP configuration.
    #[serde(default)]
    pub http_client: HttpClientConfig,
    /// Token cache configuration.
    #[serde(default)]
    pub tokens: TokensConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Broker table; empty means the built-in table.
    #[serde(default)]
    pub brokers: Vec<BrokerConfig>,
}

impl Config {
    /// Override the HTTP port from a `PORT`-style value.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the value is not a valid port.
    pub fn with_port_override(mut self, port: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(raw) = port.map(str::trim).filter(|p| !p.is_empty()) {
            self.server.http_port = raw.parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got '{raw}'"))
            })?;
            validate_config(&self)?;
        }
        Ok(self)
    }

    /// Build the broker registry from this configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid or duplicate brokers.
    pub fn broker_registry(&self) -> Result<BrokerConfigRegistry, ConfigError> {
        BrokerConfigRegistry::new(self.brokers.iter().cloned())
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let mut config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };

    if config.brokers.is_empty() {
        config.brokers = builtin_brokers()?;
    }

    validate_config(&config)?;
    Ok(config)
}

/// Default configuration with the built-in broker table.
///
/// # Errors
///
/// Returns a `ConfigError` if the built-in table fails validation, e.g. when
/// an environment override supplies an invalid base URL.
pub fn default_config() -> Result<Config, ConfigError> {
    load_config_from_string("")
}

/// Load from `TRADE_SYNC_CONFIG` when set, else defaults.
///
/// # Errors
///
/// Propagates loading and validation errors.
pub fn load_from_env() -> Result<Config, ConfigError> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => load_config(path.trim()),
        _ => default_config(),
    }
}

/// The built-in broker table, interpolated against the environment.
///
/// # Errors
///
/// Returns a parse error if the table is malformed after interpolation.
pub fn builtin_brokers() -> Result<Vec<BrokerConfig>, ConfigError> {
    Ok(serde_yaml_bw::from_str(&interpolate_env_vars(
        BUILTIN_BROKERS_YAML,
    ))?)
}

#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn env_var_regex() -> &'static Regex {
    static ENV_VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    // `${TOKEN:refresh}` and `${ENV:NAME}` do not match: only `:-` may follow the name.
    ENV_VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    })
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset or empty
/// variables without a default become empty strings.
fn interpolate_env_vars(input: &str) -> String {
    interpolate_with(input, |name| std::env::var(name).ok())
}

fn interpolate_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env_var_regex()
        .replace_all(input, |cap: &Captures<'_>| {
            let var_name = cap.get(1).map_or("", |m| m.as_str());
            let default_value = cap.get(2).map(|m| m.as_str());
            match lookup(var_name) {
                Some(v) if !v.is_empty() => v,
                _ => default_value.map_or_else(String::new, str::to_string),
            }
        })
        .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.http_port == 0 {
        return Err(ConfigError::ValidationError(
            "server.http_port must be non-zero".to_string(),
        ));
    }

    let client = &config.http_client;
    if client.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "http_client.timeout_ms must be positive".to_string(),
        ));
    }

    if client.retry_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "http_client.retry_attempts must be at least 1".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&client.jitter_factor) {
        return Err(ConfigError::ValidationError(
            "http_client.jitter_factor must be between 0.0 and 1.0".to_string(),
        ));
    }

    let valid_formats = ["pretty", "json"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    if config.observability.metrics.enabled
        && config
            .observability
            .metrics
            .listen_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        return Err(ConfigError::ValidationError(format!(
            "observability.metrics.listen_addr '{}' is not a socket address",
            config.observability.metrics.listen_addr
        )));
    }

    config.broker_registry().map(|_| ())
}
