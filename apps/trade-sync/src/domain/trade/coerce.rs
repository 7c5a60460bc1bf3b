//! Loose value coercions applied to resolved broker fields.
//!
//! Broker payloads disagree on types (`"10"` vs `10`, epoch millis vs
//! RFC 3339). These helpers never fail: unusable input degrades to `NaN`
//! or [`TradeTimestamp::Invalid`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use super::trade::TradeTimestamp;

/// Naive formats accepted after RFC 3339, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Coerce a resolved value to a string.
///
/// Absent and `null` become an empty string; containers are rendered as
/// compact JSON.
#[must_use]
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Coerce a resolved value to a number.
///
/// Follows the usual loose numeric conversion: blank strings are zero,
/// booleans are 1/0, `null` is zero, and anything unparsable is `NaN`.
#[must_use]
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Null) => 0.0,
        None | Some(Value::Array(_) | Value::Object(_)) => f64::NAN,
    }
}

/// Coerce a resolved value to a UTC instant.
///
/// Numbers are epoch milliseconds. Strings are tried as RFC 3339, then as
/// naive date-times and plain dates in UTC.
#[must_use]
pub fn coerce_timestamp(value: Option<&Value>) -> TradeTimestamp {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().and_then(from_epoch_millis),
        Some(Value::String(s)) => parse_datetime(s.trim()),
        _ => None,
    };

    parsed.map_or_else(
        || TradeTimestamp::Invalid(coerce_string(value)),
        TradeTimestamp::Instant,
    )
}

#[allow(clippy::cast_possible_truncation)]
fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(millis.trunc() as i64).single()
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!("INFY"), "INFY" ; "string")]
    #[test_case(json!(10), "10" ; "integer")]
    #[test_case(json!(1.5), "1.5" ; "float")]
    #[test_case(json!(true), "true" ; "boolean")]
    #[test_case(json!(null), "" ; "null")]
    fn string_coercion(value: Value, expected: &str) {
        assert_eq!(coerce_string(Some(&value)), expected);
    }

    #[test]
    fn absent_string_is_empty() {
        assert_eq!(coerce_string(None), "");
    }

    #[test_case(json!(10), 10.0 ; "integer")]
    #[test_case(json!(-2.5), -2.5 ; "negative float")]
    #[test_case(json!(" 1500.25 "), 1500.25 ; "padded numeric string")]
    #[test_case(json!(""), 0.0 ; "blank string")]
    #[test_case(json!(true), 1.0 ; "true")]
    #[test_case(json!(false), 0.0 ; "false")]
    #[test_case(json!(null), 0.0 ; "null")]
    fn number_coercion(value: Value, expected: f64) {
        assert!((coerce_number(Some(&value)) - expected).abs() < f64::EPSILON);
    }

    #[test_case(None ; "absent")]
    #[test_case(Some(json!("abc")) ; "non numeric string")]
    #[test_case(Some(json!([1])) ; "array")]
    #[test_case(Some(json!({"v": 1})) ; "object")]
    fn number_coercion_yields_nan(value: Option<Value>) {
        assert!(coerce_number(value.as_ref()).is_nan());
    }

    #[test]
    fn rfc3339_timestamp() {
        let ts = coerce_timestamp(Some(&json!("2025-09-03T10:00:00Z")));
        assert_eq!(ts.to_iso_string().as_deref(), Some("2025-09-03T10:00:00.000Z"));
    }

    #[test]
    fn offset_timestamp_is_normalized_to_utc() {
        let ts = coerce_timestamp(Some(&json!("2025-09-03T15:30:00+05:30")));
        assert_eq!(ts.to_iso_string().as_deref(), Some("2025-09-03T10:00:00.000Z"));
    }

    #[test]
    fn naive_timestamp_is_utc() {
        let ts = coerce_timestamp(Some(&json!("2025-09-03 10:00:00")));
        assert_eq!(ts.to_iso_string().as_deref(), Some("2025-09-03T10:00:00.000Z"));
    }

    #[test]
    fn plain_date_is_midnight() {
        let ts = coerce_timestamp(Some(&json!("2025-09-03")));
        assert_eq!(ts.to_iso_string().as_deref(), Some("2025-09-03T00:00:00.000Z"));
    }

    #[test]
    fn epoch_millis_timestamp() {
        let ts = coerce_timestamp(Some(&json!(1_756_893_600_000_i64)));
        assert_eq!(ts.to_iso_string().as_deref(), Some("2025-09-03T10:00:00.000Z"));
    }

    #[test_case(None ; "absent")]
    #[test_case(Some(json!("not a date")) ; "garbage")]
    #[test_case(Some(json!("")) ; "blank")]
    #[test_case(Some(json!(true)) ; "boolean")]
    fn invalid_timestamps(value: Option<Value>) {
        assert!(!coerce_timestamp(value.as_ref()).is_valid());
    }
}
