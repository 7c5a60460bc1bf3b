//! Broker response shapes understood by the generic adapter.
//!
//! Brokers disagree on naming, so both snake_case and camelCase token fields
//! are accepted and the first non-empty one wins.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::auth::Token;

// ============================================================================
// Error Responses
// ============================================================================

/// `(code, message)` for a non-2xx response.
///
/// Uses the body's `code` (string or number) and `message` (or `error`)
/// when present, else `HTTP_<status>` / `HTTP <status> Error`.
pub fn parse_error_body(status: u16, body: &str) -> (String, String) {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| parsed.as_ref().and_then(|v| v.get(name));

    let code = match field("code") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("HTTP_{status}"),
    };

    let message = [field("message"), field("error")]
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().filter(|s| !s.trim().is_empty()))
        .map_or_else(|| format!("HTTP {status} Error"), str::to_string);

    (code, message)
}

// ============================================================================
// Token Responses
// ============================================================================

/// Refresh endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    access_token: Option<String>,
    #[serde(rename = "accessToken")]
    access_token_camel: Option<String>,
    refresh_token: Option<String>,
    #[serde(rename = "refreshToken")]
    refresh_token_camel: Option<String>,
    /// Lifetime in seconds (number or numeric string).
    expires_in: Option<Value>,
    /// Expiry as epoch milliseconds or RFC 3339 text.
    expires_at: Option<Value>,
}

impl TokenResponse {
    /// Build a token from this response.
    ///
    /// A missing refresh credential keeps the previous one so refresh
    /// chains survive brokers that only rotate access tokens.
    ///
    /// Only a positive `expires_in` counts; zero, negative or unrepresentable
    /// lifetimes fall through to `expires_at`, then to `default_lease`.
    pub fn into_token(
        self,
        previous: Option<&Token>,
        default_lease: Duration,
        now: DateTime<Utc>,
    ) -> Result<Token, String> {
        let access_token = first_non_empty(self.access_token, self.access_token_camel)
            .ok_or_else(|| "Token response has no access_token".to_string())?;

        let refresh_token = first_non_empty(self.refresh_token, self.refresh_token_camel)
            .or_else(|| previous.map(|t| t.refresh_token.clone()))
            .unwrap_or_default();

        let expires_at = self
            .expires_in
            .as_ref()
            .and_then(as_seconds)
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| lifetime_from_secs(secs, now))
            .or_else(|| self.expires_at.as_ref().and_then(as_instant))
            .unwrap_or_else(|| now.checked_add_signed(default_lease).unwrap_or(now));

        Ok(Token::new(access_token, refresh_token, expires_at))
    }
}

fn first_non_empty(a: Option<String>, b: Option<String>) -> Option<String> {
    a.into_iter().chain(b).find(|s| !s.is_empty())
}

fn as_seconds(value: &Value) -> Option<f64> {
    let secs: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    secs.filter(|secs| secs.is_finite())
}

fn lifetime_from_secs(secs: f64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let millis = secs * 1000.0;
    if millis >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64).and_then(|lease| now.checked_add_signed(lease))
}

fn as_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}
