//! Trade normalization bounded context.
//!
//! Turns broker-native trade records into canonical [`Trade`]s using a
//! declarative [`FieldMapping`].

pub mod coerce;
pub mod mapping;
pub mod path;
pub mod trade;

pub use mapping::FieldMapping;
pub use path::resolve_path;
pub use trade::{NormalizedTrade, Trade, TradeError, TradeSide, TradeTimestamp};
