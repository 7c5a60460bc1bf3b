//! Bearer credential pair with an expiry instant.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Safety margin subtracted from expiry so tokens refresh before they lapse.
pub const DEFAULT_EXPIRY_SKEW_MS: i64 = 30_000;

/// [`DEFAULT_EXPIRY_SKEW_MS`] as a duration.
#[must_use]
pub fn default_expiry_skew() -> Duration {
    Duration::milliseconds(DEFAULT_EXPIRY_SKEW_MS)
}

/// Access/refresh credential pair issued by a broker.
///
/// Tokens are replaced wholesale on refresh and never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Credential attached as `Authorization: Bearer`.
    pub access_token: String,
    /// Credential exchanged for a new access token.
    pub refresh_token: String,
    /// Expiry instant; `None` means unknown and is treated as expired.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Create a token expiring at `expires_at`.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Whether this token has a usable access credential.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Whether `token` must be refreshed as of now.
#[must_use]
pub fn is_expired(token: Option<&Token>, skew: Duration) -> bool {
    is_expired_at(token, skew, Utc::now())
}

/// Whether `token` must be refreshed as of `now`.
///
/// True when the token is absent, has no expiry, or `expires_at - skew <= now`.
#[must_use]
pub fn is_expired_at(token: Option<&Token>, skew: Duration, now: DateTime<Utc>) -> bool {
    match token.and_then(|t| t.expires_at) {
        Some(expires_at) => expires_at
            .checked_sub_signed(skew)
            .is_none_or(|refresh_at| refresh_at <= now),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn absent_token_is_expired() {
        assert!(is_expired_at(None, default_expiry_skew(), at(0)));
    }

    #[test]
    fn token_without_expiry_is_expired() {
        let token = Token {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: None,
        };
        assert!(is_expired_at(Some(&token), default_expiry_skew(), at(0)));
    }

    #[test]
    fn token_inside_skew_window_is_expired() {
        let token = Token::new("a", "r", at(20));
        assert!(is_expired_at(Some(&token), default_expiry_skew(), at(0)));
    }

    #[test]
    fn token_at_skew_boundary_is_expired() {
        let token = Token::new("a", "r", at(30));
        assert!(is_expired_at(Some(&token), default_expiry_skew(), at(0)));
    }

    #[test]
    fn token_beyond_skew_is_valid() {
        let token = Token::new("a", "r", at(31));
        assert!(!is_expired_at(Some(&token), default_expiry_skew(), at(0)));
    }

    #[test]
    fn zero_skew_uses_raw_expiry() {
        let token = Token::new("a", "r", at(1));
        assert!(!is_expired_at(Some(&token), Duration::zero(), at(0)));
        assert!(is_expired_at(Some(&token), Duration::zero(), at(1)));
    }

    #[test]
    fn expiry_near_min_instant_is_expired() {
        let expires_at = DateTime::<Utc>::MIN_UTC + Duration::seconds(1);
        let token = Token::new("a", "r", expires_at);
        assert!(is_expired_at(Some(&token), default_expiry_skew(), at(0)));
        assert!(is_expired(Some(&token), default_expiry_skew()));
    }

    #[test]
    fn expiry_near_max_instant_is_valid() {
        let token = Token::new("a", "r", DateTime::<Utc>::MAX_UTC);
        assert!(!is_expired_at(Some(&token), default_expiry_skew(), at(0)));
    }

    #[test]
    fn serializes_camel_case() {
        let token = Token::new("a", "r", at(0));
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
        assert!(json.get("expiresAt").is_some());
    }

    proptest! {
        #[test]
        fn expiry_is_monotonic_in_now(expiry in -10_000i64..10_000, t1 in -10_000i64..10_000, dt in 0i64..10_000, skew in 0i64..120_000) {
            let token = Token::new("a", "r", at(expiry));
            let skew = Duration::milliseconds(skew);
            if is_expired_at(Some(&token), skew, at(t1)) {
                prop_assert!(is_expired_at(Some(&token), skew, at(t1 + dt)));
            }
        }
    }
}
