//! Canonical trade types.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Direction of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    /// Bought.
    Buy,
    /// Sold.
    Sell,
}

impl TradeSide {
    /// Infer the side from a broker side label and the signed quantity.
    ///
    /// An explicit `sell` label (any case) wins. With no label, a negative
    /// quantity means the broker encodes direction in the sign. Everything
    /// else is a buy.
    #[must_use]
    pub fn infer(label: &str, quantity: f64) -> Self {
        let label = label.trim().to_uppercase();
        if label == "SELL" {
            return Self::Sell;
        }
        if label.is_empty() && quantity < 0.0 {
            return Self::Sell;
        }
        Self::Buy
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Execution time of a normalized trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeTimestamp {
    /// A valid UTC instant.
    Instant(DateTime<Utc>),
    /// The source value could not be parsed; carries the raw text.
    Invalid(String),
}

impl TradeTimestamp {
    /// Whether this is a usable instant.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Instant(_))
    }

    /// The instant, if valid.
    #[must_use]
    pub const fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(dt) => Some(*dt),
            Self::Invalid(_) => None,
        }
    }

    /// ISO-8601 rendering with millisecond precision, if valid.
    #[must_use]
    pub fn to_iso_string(&self) -> Option<String> {
        self.instant().map(|dt| to_iso_millis(&dt))
    }
}

/// Output of the mapping normalizer, before canonical validation.
///
/// Numeric fields may be `NaN` and the timestamp may be invalid; these are
/// data-quality signals rather than errors at this layer.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTrade {
    /// Instrument symbol.
    pub symbol: String,
    /// Signed or unsigned quantity as reported by the broker.
    pub quantity: f64,
    /// Execution or average price.
    pub price: f64,
    /// Execution time.
    pub timestamp: TradeTimestamp,
    /// Trade direction.
    pub side: TradeSide,
}

impl NormalizedTrade {
    /// Names of numeric fields that failed to coerce.
    #[must_use]
    pub fn malformed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.quantity.is_nan() {
            fields.push("quantity");
        }
        if self.price.is_nan() {
            fields.push("price");
        }
        fields
    }
}

/// Errors raised when promoting a normalized record to a canonical trade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    /// The timestamp could not be parsed.
    #[error("invalid timestamp '{raw}' for {symbol}")]
    InvalidTimestamp {
        /// Symbol of the offending record.
        symbol: String,
        /// Raw timestamp text.
        raw: String,
    },
}

/// Canonical, broker-agnostic trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Instrument symbol.
    pub symbol: String,
    /// Quantity (`NaN` serializes as `null`).
    pub quantity: f64,
    /// Price (`NaN` serializes as `null`).
    pub price: f64,
    /// Execution time, always a valid instant.
    #[serde(serialize_with = "serialize_iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Trade direction.
    pub side: TradeSide,
}

impl TryFrom<NormalizedTrade> for Trade {
    type Error = TradeError;

    fn try_from(normalized: NormalizedTrade) -> Result<Self, Self::Error> {
        let timestamp = match normalized.timestamp {
            TradeTimestamp::Instant(dt) => dt,
            TradeTimestamp::Invalid(raw) => {
                return Err(TradeError::InvalidTimestamp {
                    symbol: normalized.symbol,
                    raw,
                });
            }
        };

        Ok(Self {
            symbol: normalized.symbol,
            quantity: normalized.quantity,
            price: normalized.price,
            timestamp,
            side: normalized.side,
        })
    }
}

fn to_iso_millis(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso_millis<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_iso_millis(dt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("SELL", 10.0, TradeSide::Sell ; "explicit sell")]
    #[test_case("sell", 10.0, TradeSide::Sell ; "lowercase sell")]
    #[test_case("Sell", -3.0, TradeSide::Sell ; "sell with negative quantity")]
    #[test_case("buy", -3.0, TradeSide::Buy ; "explicit buy overrides sign")]
    #[test_case("", -3.0, TradeSide::Sell ; "signed quantity")]
    #[test_case("", 3.0, TradeSide::Buy ; "positive quantity")]
    #[test_case("", f64::NAN, TradeSide::Buy ; "nan quantity")]
    #[test_case("-5", -5.0, TradeSide::Buy ; "non empty label ignores sign")]
    fn side_inference(label: &str, quantity: f64, expected: TradeSide) {
        assert_eq!(TradeSide::infer(label, quantity), expected);
    }

    proptest! {
        #[test]
        fn sell_label_always_sells(quantity in any::<f64>()) {
            prop_assert_eq!(TradeSide::infer("sElL", quantity), TradeSide::Sell);
        }

        #[test]
        fn unlabeled_side_follows_sign(quantity in -1.0e9f64..1.0e9) {
            let expected = if quantity < 0.0 { TradeSide::Sell } else { TradeSide::Buy };
            prop_assert_eq!(TradeSide::infer("", quantity), expected);
        }
    }

    #[test]
    fn side_display_and_serde() {
        assert_eq!(TradeSide::Sell.to_string(), "SELL");
        assert_eq!(serde_json::to_string(&TradeSide::Buy).unwrap(), "\"BUY\"");
    }

    #[test]
    fn trade_from_valid_normalized() {
        let dt = Utc.with_ymd_and_hms(2025, 9, 3, 10, 0, 0).unwrap();
        let trade = Trade::try_from(NormalizedTrade {
            symbol: "INFY".to_string(),
            quantity: 10.0,
            price: 1500.0,
            timestamp: TradeTimestamp::Instant(dt),
            side: TradeSide::Buy,
        })
        .unwrap();

        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["timestamp"], "2025-09-03T10:00:00.000Z");
        assert_eq!(json["side"], "BUY");
        assert_eq!(json["quantity"], 10.0);
    }

    #[test]
    fn trade_rejects_invalid_timestamp() {
        let err = Trade::try_from(NormalizedTrade {
            symbol: "TCS".to_string(),
            quantity: 1.0,
            price: 1.0,
            timestamp: TradeTimestamp::Invalid("yesterday".to_string()),
            side: TradeSide::Sell,
        })
        .unwrap_err();

        assert_eq!(
            err,
            TradeError::InvalidTimestamp {
                symbol: "TCS".to_string(),
                raw: "yesterday".to_string(),
            }
        );
    }

    #[test]
    fn nan_quantity_serializes_as_null() {
        let trade = Trade {
            symbol: "X".to_string(),
            quantity: f64::NAN,
            price: 1.0,
            timestamp: Utc::now(),
            side: TradeSide::Buy,
        };
        let json = serde_json::to_value(&trade).unwrap();
        assert!(json["quantity"].is_null());
    }

    #[test]
    fn malformed_fields_lists_nan_values() {
        let normalized = NormalizedTrade {
            symbol: "X".to_string(),
            quantity: f64::NAN,
            price: f64::NAN,
            timestamp: TradeTimestamp::Instant(Utc::now()),
            side: TradeSide::Buy,
        };
        assert_eq!(normalized.malformed_fields(), vec!["quantity", "price"]);
    }
}
