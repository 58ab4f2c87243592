//! Admin session validation.
//!
//! A credential bundle is three storage slots: the access token, the admin
//! metadata object, and an optional session object. Validation reads all
//! three and answers with a `Validity` carrying the exact rejection reason,
//! so callers and tests never have to guess why a bundle was thrown out.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::keys::{ADMIN_DATA, ADMIN_SESSION, ADMIN_TOKEN};
use crate::storage::{Storage, StorageError};

use super::token::{self, TokenError};

/// Admin metadata stored under `adminData`.
/// Written by the login flow; unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminData {
    pub role: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "lastLogin")]
    pub last_login: Option<String>,
}

/// Session object stored under `adminSession`.
/// Only the fields validation cares about; the liveness refresh edits the
/// raw JSON instead so nothing else is dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSession {
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<String>,
    #[serde(rename = "lastActivity")]
    pub last_activity: Option<String>,
}

/// Why a credential bundle was rejected
#[derive(Debug)]
pub enum InvalidReason {
    /// No value under the token slot
    MissingToken,
    /// No value under the metadata slot
    MissingData,
    /// Metadata slot did not parse as JSON
    MalformedData,
    /// Metadata role is not "admin"
    WrongRole(Option<String>),
    /// Segmented token failed validation
    TokenRejected(TokenError),
    /// Session object carries an `expiresAt` in the past
    SessionExpired { expires_at: String },
    /// The storage backend itself failed
    Storage(StorageError),
}

/// Outcome of validating a credential bundle
#[derive(Debug)]
pub enum Validity {
    Valid,
    Invalid(InvalidReason),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Read a slot, degrading a storage failure to an invalidity reason
fn read_slot(storage: &dyn Storage, key: &str) -> Result<Option<String>, InvalidReason> {
    storage.get(key).map_err(|e| {
        warn!(key, error = %e, "storage read failed during validation");
        InvalidReason::Storage(e)
    })
}

/// Validate the admin credential bundle at time `now`.
///
/// Fails closed on everything except a malformed session object, which is
/// tolerated and only logged (longstanding behavior carried over from the
/// original validator; pending product-owner confirmation).
pub fn validate(storage: &dyn Storage, now: DateTime<Utc>) -> Validity {
    match validate_inner(storage, now) {
        Ok(()) => Validity::Valid,
        Err(reason) => {
            debug!(?reason, "admin session rejected");
            Validity::Invalid(reason)
        }
    }
}

fn validate_inner(storage: &dyn Storage, now: DateTime<Utc>) -> Result<(), InvalidReason> {
    let token = read_slot(storage, ADMIN_TOKEN)?.ok_or(InvalidReason::MissingToken)?;
    let data = read_slot(storage, ADMIN_DATA)?.ok_or(InvalidReason::MissingData)?;

    let admin_data: AdminData = serde_json::from_str(&data).map_err(|e| {
        warn!(error = %e, "admin metadata is not valid JSON");
        InvalidReason::MalformedData
    })?;
    if admin_data.role.as_deref() != Some("admin") {
        return Err(InvalidReason::WrongRole(admin_data.role));
    }

    // Opaque tokens pass through; only segmented tokens carry claims to check
    if token.contains('.') {
        token::validate(&token, now).map_err(InvalidReason::TokenRejected)?;
    }

    if let Some(raw_session) = read_slot(storage, ADMIN_SESSION)? {
        check_session_expiry(&raw_session, now)?;
    }

    Ok(())
}

/// Reject only a well-formed session whose `expiresAt` is in the past.
/// A session that fails to parse, or an `expiresAt` that is not a
/// timestamp, is logged and ignored.
fn check_session_expiry(raw_session: &str, now: DateTime<Utc>) -> Result<(), InvalidReason> {
    let session: AdminSession = match serde_json::from_str(raw_session) {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "session slot is malformed, ignoring");
            return Ok(());
        }
    };

    if let Some(expires_at) = session.expires_at {
        match DateTime::parse_from_rfc3339(&expires_at) {
            Ok(expiry) if now > expiry => {
                return Err(InvalidReason::SessionExpired { expires_at });
            }
            Ok(_) => {}
            Err(e) => {
                warn!(%expires_at, error = %e, "session expiry is not a timestamp, ignoring");
            }
        }
    }

    Ok(())
}
