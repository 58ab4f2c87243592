//! Access token inspection.
//!
//! Admin tokens are either opaque strings or 3-segment dot-separated
//! base64url tokens whose middle segment is a JSON claims object. Only
//! segmented tokens are inspected here; everything fails closed to a typed
//! rejection reason.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::keys::TOKEN_EXPIRY_GRACE_SECS;

/// Claims carried in the middle segment of a segmented token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiry, epoch seconds
    pub exp: Option<i64>,
    /// Issued-at, epoch seconds
    pub iat: Option<i64>,
    pub role: Option<String>,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token does not have exactly 3 segments")]
    NotSegmented,

    #[error("token payload is not valid base64url: {0}")]
    PayloadEncoding(#[from] base64::DecodeError),

    #[error("token payload is not a valid claims object: {0}")]
    PayloadParse(#[from] serde_json::Error),

    #[error("token expired at {exp} (past the grace window)")]
    Expired { exp: i64 },

    #[error("token role is {0:?}, expected \"admin\"")]
    WrongRole(Option<String>),
}

/// Decode a base64url segment, tolerating standard-alphabet characters and
/// padding the way the original browser decoder did
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    URL_SAFE_NO_PAD.decode(normalized.as_bytes())
}

/// Decode the claims object from a 3-segment token without checking them
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    if !token.contains('.') {
        return Err(TokenError::NotSegmented);
    }
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::NotSegmented);
    }

    let payload = decode_segment(parts[1])?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Validate a segmented token at time `now`.
///
/// Fails closed: malformed segments, an `exp` more than the grace window in
/// the past, or a role other than `"admin"` all reject the token. A missing
/// `exp` is accepted (the session-level expiry still applies).
pub fn validate(token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
    let claims = decode_claims(token)?;

    if let Some(exp) = claims.exp {
        if exp < now.timestamp() - TOKEN_EXPIRY_GRACE_SECS {
            debug!(exp, "admin token expired");
            return Err(TokenError::Expired { exp });
        }
    }

    if claims.role.as_deref() != Some("admin") {
        debug!(role = ?claims.role, "token role is not admin");
        return Err(TokenError::WrongRole(claims.role));
    }

    Ok(claims)
}

/// Convenience wrapper for callers that only need a yes/no answer
pub fn is_valid(token: &str, now: DateTime<Utc>) -> bool {
    validate(token, now).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

    /// Build a 3-segment token with the given JSON payload
    fn token_with_payload(payload: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode("signature")
        )
    }

    fn admin_token(exp: i64, now: DateTime<Utc>) -> String {
        token_with_payload(&format!(
            r#"{{"exp":{},"iat":{},"role":"admin"}}"#,
            exp,
            now.timestamp() - 60
        ))
    }

    #[test]
    fn test_valid_admin_token() {
        let now = Utc::now();
        let token = admin_token(now.timestamp() + 3600, now);
        assert!(is_valid(&token, now));
    }

    #[test]
    fn test_dotless_token_is_not_segmented() {
        assert!(matches!(
            decode_claims("opaque-token"),
            Err(TokenError::NotSegmented)
        ));
    }

    #[test]
    fn test_two_segments_rejected() {
        let now = Utc::now();
        assert!(matches!(
            validate("header.payload", now),
            Err(TokenError::NotSegmented)
        ));
    }

    #[test]
    fn test_garbage_payload_rejected() {
        let now = Utc::now();
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json"));
        assert!(matches!(
            validate(&token, now),
            Err(TokenError::PayloadParse(_))
        ));
    }

    #[test]
    fn test_expiry_grace_boundary() {
        let now = Utc::now();

        // 301s past expiry: just outside the 5-minute grace window
        let expired = admin_token(now.timestamp() - 301, now);
        assert!(matches!(
            validate(&expired, now),
            Err(TokenError::Expired { .. })
        ));

        // 299s past expiry: still inside the grace window
        let in_grace = admin_token(now.timestamp() - 299, now);
        assert!(is_valid(&in_grace, now));
    }

    #[test]
    fn test_missing_exp_is_accepted() {
        let now = Utc::now();
        let token = token_with_payload(r#"{"role":"admin"}"#);
        assert!(is_valid(&token, now));
    }

    #[test]
    fn test_wrong_role_rejected() {
        let now = Utc::now();
        let token = token_with_payload(&format!(
            r#"{{"exp":{},"role":"user"}}"#,
            now.timestamp() + 3600
        ));
        assert!(matches!(
            validate(&token, now),
            Err(TokenError::WrongRole(Some(ref r))) if r == "user"
        ));
    }

    #[test]
    fn test_missing_role_rejected() {
        let now = Utc::now();
        let token = token_with_payload(&format!(r#"{{"exp":{}}}"#, now.timestamp() + 3600));
        assert!(matches!(
            validate(&token, now),
            Err(TokenError::WrongRole(None))
        ));
    }

    #[test]
    fn test_standard_alphabet_payload_accepted() {
        let now = Utc::now();
        // Same payload, standard alphabet with padding; decoder normalizes it
        let payload = STANDARD.encode(format!(
            r#"{{"exp":{},"role":"admin"}}"#,
            now.timestamp() + 3600
        ));
        let token = format!("h.{}.s", payload);
        assert!(is_valid(&token, now));
    }
}
