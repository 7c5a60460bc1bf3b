// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Trade Sync - Rust Core Library
//!
//! Pulls executed trades from brokerage APIs and returns them in one
//! canonical shape.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure data and rules
//!   - `trade`: path resolver, field mapping normalizer, canonical `Trade`
//!   - `auth`: `Token` and the expiry rule
//!   - `broker`: broker descriptors, refresh templates, registry
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `BrokerPort`, `SecretSource`
//!   - `services`: `TokenCache`
//!   - `use_cases`: `SyncTrades`
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `broker`: config-driven HTTP broker adapter
//!   - `http`: REST API (`POST /api/v1/sync`)
//!   - `config`: dependency injection container
//!   - `secrets`: process environment secret source

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Retry policy and error classification for broker calls.
pub mod broker;

/// YAML configuration loading.
pub mod config;

/// API error codes and responses.
pub mod error;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::auth::Token;
pub use domain::broker::{BrokerConfig, BrokerConfigRegistry, RefreshTemplate};
pub use domain::trade::{FieldMapping, NormalizedTrade, Trade, TradeSide, resolve_path};

// Application re-exports
pub use application::ports::{BrokerError, BrokerPort, SecretSource, StaticSecrets};
pub use application::services::TokenCache;
pub use application::use_cases::{SyncError, SyncTradesUseCase};

// Infrastructure re-exports
pub use infrastructure::broker::{GenericAdapterConfig, GenericBrokerAdapter};
pub use infrastructure::config::Container;
pub use infrastructure::http::{AppState, create_router};
