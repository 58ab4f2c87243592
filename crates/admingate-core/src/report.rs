//! Session diagnostics snapshot.
//!
//! A read-only view of the credential bundle for operators: which slots are
//! populated, what the metadata claims, and how long a segmented token has
//! left. Collecting a report never mutates storage.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::auth::session::AdminData;
use crate::auth::token;
use crate::keys::{ADMIN_DATA, ADMIN_SESSION, ADMIN_TOKEN};
use crate::storage::Storage;

/// Expiry details for a segmented token
#[derive(Debug, Clone)]
pub struct TokenReport {
    /// Past the raw `exp` (the validation grace window is not applied here)
    pub expired: bool,
    pub minutes_to_expiry: Option<i64>,
    pub issued_at: Option<DateTime<Utc>>,
}

/// Snapshot of the credential bundle
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub has_token: bool,
    pub has_data: bool,
    pub has_session: bool,
    pub role: Option<String>,
    pub user_id: Option<String>,
    pub last_login: Option<String>,
    pub token: Option<TokenReport>,
}

impl SessionReport {
    /// Collect a snapshot at time `now`. Storage failures and malformed
    /// slots degrade to absent fields; nothing is written back.
    pub fn collect(storage: &dyn Storage, now: DateTime<Utc>) -> Self {
        let token_slot = read_quietly(storage, ADMIN_TOKEN);
        let data_slot = read_quietly(storage, ADMIN_DATA);
        let session_slot = read_quietly(storage, ADMIN_SESSION);

        let (role, user_id, last_login) = match data_slot.as_deref() {
            Some(raw) => match serde_json::from_str::<AdminData>(raw) {
                Ok(data) => (data.role, data.id, data.last_login),
                Err(e) => {
                    warn!(error = %e, "admin metadata is not valid JSON");
                    (None, None, None)
                }
            },
            None => (None, None, None),
        };

        let token_report = token_slot
            .as_deref()
            .filter(|t| t.contains('.'))
            .and_then(|t| match token::decode_claims(t) {
                Ok(claims) => Some(TokenReport {
                    expired: claims.exp.is_some_and(|exp| exp <= now.timestamp()),
                    minutes_to_expiry: claims
                        .exp
                        .map(|exp| (exp - now.timestamp()).max(0) / 60),
                    issued_at: claims.iat.and_then(|iat| DateTime::from_timestamp(iat, 0)),
                }),
                Err(e) => {
                    warn!(error = %e, "could not decode token for report");
                    None
                }
            });

        Self {
            has_token: token_slot.is_some(),
            has_data: data_slot.is_some(),
            has_session: session_slot.is_some(),
            role,
            user_id,
            last_login,
            token: token_report,
        }
    }

    /// True when the bundle looks logged-in at a glance (token and
    /// metadata slots populated)
    pub fn looks_logged_in(&self) -> bool {
        self.has_token && self.has_data
    }
}

fn read_quietly(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "storage read failed while collecting report");
            None
        }
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "token: {}  metadata: {}  session: {}",
            present(self.has_token),
            present(self.has_data),
            present(self.has_session)
        )?;
        if let Some(ref role) = self.role {
            writeln!(f, "role: {}", role)?;
        }
        if let Some(ref id) = self.user_id {
            writeln!(f, "user id: {}", id)?;
        }
        if let Some(ref last_login) = self.last_login {
            writeln!(f, "last login: {}", last_login)?;
        }
        match self.token {
            Some(ref token) => {
                let expiry = match (token.expired, token.minutes_to_expiry) {
                    (true, _) => "expired".to_string(),
                    (false, Some(minutes)) => format!("expires in {}m", minutes),
                    (false, None) => "no expiry claim".to_string(),
                };
                write!(f, "token claims: {}", expiry)?;
                if let Some(issued_at) = token.issued_at {
                    write!(f, ", issued {}", issued_at.format("%Y-%m-%d %H:%M UTC"))?;
                }
                writeln!(f)?;
            }
            None if self.has_token => writeln!(f, "token claims: opaque token")?,
            None => {}
        }
        Ok(())
    }
}

fn present(value: bool) -> &'static str {
    if value {
        "present"
    } else {
        "absent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    #[test]
    fn test_empty_storage_report() {
        let store = MemoryStorage::new();
        let report = SessionReport::collect(&store, Utc::now());
        assert!(!report.looks_logged_in());
        assert!(!report.has_session);
        assert!(report.token.is_none());
    }

    #[test]
    fn test_report_reads_metadata_fields() {
        let store = MemoryStorage::from_entries([
            (ADMIN_TOKEN, "opaque"),
            (
                ADMIN_DATA,
                r#"{"role":"admin","id":"u1","lastLogin":"2026-08-01T10:00:00Z"}"#,
            ),
        ]);
        let report = SessionReport::collect(&store, Utc::now());
        assert!(report.looks_logged_in());
        assert_eq!(report.role.as_deref(), Some("admin"));
        assert_eq!(report.user_id.as_deref(), Some("u1"));
        assert!(report.token.is_none());
    }

    #[test]
    fn test_report_decodes_segmented_token() {
        let now = Utc::now();
        let payload = format!(
            r#"{{"exp":{},"iat":{},"role":"admin"}}"#,
            now.timestamp() + 600,
            now.timestamp() - 60
        );
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload));
        let store = MemoryStorage::from_entries([
            (ADMIN_TOKEN, token.as_str()),
            (ADMIN_DATA, r#"{"role":"admin"}"#),
        ]);

        let report = SessionReport::collect(&store, now);
        let token_report = report.token.expect("segmented token should decode");
        assert!(!token_report.expired);
        assert_eq!(token_report.minutes_to_expiry, Some(10));
        assert!(token_report.issued_at.is_some());
    }

    #[test]
    fn test_collect_never_mutates_storage() {
        let store = MemoryStorage::from_entries([(ADMIN_TOKEN, "opaque")]);
        let before = store.keys().unwrap();
        let _ = SessionReport::collect(&store, Utc::now());
        assert_eq!(store.keys().unwrap(), before);
    }
}
