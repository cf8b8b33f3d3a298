//! Access-token claim decoding
//!
//! Access tokens are JWTs signed by the backend. The client never verifies
//! the signature; it only reads the `exp` claim to decide when to refresh.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claims carried in the access-token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Expiry, Unix seconds
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

impl AccessClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    #[error("token is not a JWT")]
    Malformed,
    #[error("token payload is not base64url: {0}")]
    Encoding(String),
    #[error("token payload is not valid claims JSON: {0}")]
    Payload(String),
}

/// Decode the payload segment of `token`
pub fn decode(token: &str) -> Result<AccessClaims, ClaimsError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if !payload.is_empty() => payload,
        _ => return Err(ClaimsError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClaimsError::Encoding(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ClaimsError::Payload(e.to_string()))
}

/// Whether `token` must be refreshed before use.
///
/// A token whose claims cannot be read counts as expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match decode(token) {
        Ok(claims) => claims.exp <= now.timestamp(),
        Err(err) => {
            tracing::debug!(error = %err, "unreadable access token treated as expired");
            true
        }
    }
}

/// Delay until the proactive renewal of `token` should run: `exp - now - lead`.
///
/// Returns `None` when that is not strictly positive or the token cannot be
/// decoded; no timer should be armed in that case.
pub fn renewal_delay(token: &str, now: DateTime<Utc>, lead: Duration) -> Option<Duration> {
    let claims = decode(token).ok()?;
    let lead_ms = i64::try_from(lead.as_millis()).ok()?;
    let remaining_ms = claims
        .exp
        .checked_mul(1000)?
        .checked_sub(now.timestamp_millis())?
        .checked_sub(lead_ms)?;

    if remaining_ms > 0 {
        u64::try_from(remaining_ms).ok().map(Duration::from_millis)
    } else {
        None
    }
}

/// Build an unsigned token carrying `claims`.
///
/// Test fixture only; the backend never accepts these.
#[cfg(any(test, feature = "test-util"))]
pub fn encode_unsigned(claims: &AccessClaims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = serde_json::to_vec(claims).expect("claims serialize to JSON");
    format!("{header}.{}.", URL_SAFE_NO_PAD.encode(claims))
}
