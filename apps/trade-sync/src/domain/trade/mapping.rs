//! Declarative field mapping from broker records to canonical trades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{coerce_number, coerce_string, coerce_timestamp};
use super::path::resolve_path;
use super::trade::{NormalizedTrade, TradeSide, TradeTimestamp};

/// Dotted paths locating each canonical field inside a raw trade record.
///
/// An empty `timestamp` path stamps the record with the normalization time.
/// An empty `side` path lets the quantity sign decide the direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Path to the instrument symbol.
    pub symbol: String,
    /// Path to the quantity.
    pub quantity: String,
    /// Path to the price.
    pub price: String,
    /// Path to the execution time.
    #[serde(default)]
    pub timestamp: String,
    /// Path to the side label.
    #[serde(default)]
    pub side: String,
}

impl FieldMapping {
    /// Apply this mapping to a raw record, stamping unmapped times with now.
    #[must_use]
    pub fn normalize(&self, raw: &Value) -> NormalizedTrade {
        self.normalize_at(raw, Utc::now())
    }

    /// Apply this mapping using `now` for unmapped timestamps.
    #[must_use]
    pub fn normalize_at(&self, raw: &Value, now: DateTime<Utc>) -> NormalizedTrade {
        let symbol = coerce_string(lookup(raw, &self.symbol));
        let quantity = coerce_number(lookup(raw, &self.quantity));
        let price = coerce_number(lookup(raw, &self.price));

        let timestamp = if self.timestamp.trim().is_empty() {
            TradeTimestamp::Instant(now)
        } else {
            coerce_timestamp(lookup(raw, &self.timestamp))
        };

        let side_label = coerce_string(lookup(raw, &self.side));
        let side = TradeSide::infer(&side_label, quantity);

        NormalizedTrade {
            symbol,
            quantity,
            price,
            timestamp,
            side,
        }
    }
}

/// Field lookup where an empty path means "not mapped".
///
/// Unlike the response extractor, an unmapped field must never resolve to
/// the whole record.
fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    if path.trim().is_empty() {
        return None;
    }
    resolve_path(raw, path)
}
