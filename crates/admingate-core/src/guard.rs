//! Page-load enforcement flow.
//!
//! Run once per page load: validate the credential bundle, then either
//! refresh the session's liveness timestamp or purge all auth material and
//! (under a protected path) schedule a redirect to the login page.
//!
//! The flow never propagates an error. Anything unexpected is logged at
//! error level and swallowed so a broken storage area can never take the
//! page down with it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::auth::session::{self, InvalidReason, Validity};
use crate::keys::{
    ADMIN_KEYS, ADMIN_PATH_PREFIX, ADMIN_REDIRECT_URL, ADMIN_SESSION, BIOMETRIC_PREFIX,
    LEGACY_KEYS, LOGIN_PATH, REDIRECT_DELAY_MS, REDIRECT_EXEMPT_PATHS,
};
use crate::storage::Storage;

/// Location of the page the flow is running under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Path component, always starting with `/`
    pub path: String,
    /// Query component including the leading `?`, or empty
    pub query: String,
}

impl PageLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: String::new(),
        }
    }

    /// Split a `path?query` string into its components
    pub fn parse(location: &str) -> Self {
        match location.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: format!("?{}", query),
            },
            None => Self::new(location),
        }
    }

    /// Path plus query, the exact value persisted to the redirect slot
    pub fn target(&self) -> String {
        format!("{}{}", self.path, self.query)
    }
}

/// A navigation that has been decided but not yet performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRedirect {
    /// The path+query the user was trying to reach
    pub attempted: String,
    /// Where the navigation will go
    pub destination: String,
}

/// Result of one enforcement pass
#[derive(Debug)]
pub enum Outcome {
    /// Bundle was valid; liveness timestamp refreshed, storage otherwise
    /// untouched
    Preserved,
    /// Bundle was invalid; auth material purged, with a redirect pending
    /// when the page is under a protected path
    Cleared {
        reason: InvalidReason,
        redirect: Option<PendingRedirect>,
    },
    /// The flow hit an unexpected failure and left storage alone
    Skipped,
}

/// Navigation seam; the browser's `location` assignment in the original
pub trait Navigator {
    fn navigate(&self, location: &str);
}

/// Remove every piece of auth material: the admin-namespace keys, all
/// biometric enrollment keys, and the legacy keys from earlier releases.
///
/// Best-effort: individual removal failures are logged and skipped so one
/// bad key never leaves the rest of the bundle behind.
pub fn clear_invalid_auth(storage: &mut dyn Storage) {
    for key in ADMIN_KEYS {
        if let Err(e) = storage.remove(key) {
            warn!(key, error = %e, "failed to remove auth key");
        }
    }

    match storage.keys() {
        Ok(keys) => {
            for key in keys.iter().filter(|k| k.starts_with(BIOMETRIC_PREFIX)) {
                if let Err(e) = storage.remove(key) {
                    warn!(key, error = %e, "failed to remove biometric key");
                }
            }
        }
        Err(e) => warn!(error = %e, "could not enumerate keys for biometric cleanup"),
    }

    for key in LEGACY_KEYS {
        if let Err(e) = storage.remove(key) {
            warn!(key, error = %e, "failed to remove legacy auth key");
        }
    }

    debug!("cleared invalid admin authentication data");
}

/// Rewrite the session's `lastActivity` to `now`, preserving every other
/// field. Best-effort: a missing, malformed, or non-object session is
/// logged and left alone.
pub fn refresh_last_activity(storage: &mut dyn Storage, now: DateTime<Utc>) {
    let raw = match storage.get(ADMIN_SESSION) {
        Ok(Some(raw)) => raw,
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "could not read session for liveness refresh");
            return;
        }
    };

    let mut value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "failed to update last activity");
            return;
        }
    };

    match value.as_object_mut() {
        Some(session) => {
            session.insert(
                "lastActivity".to_string(),
                Value::String(now.to_rfc3339()),
            );
        }
        None => {
            warn!("session slot is not a JSON object, skipping liveness refresh");
            return;
        }
    }

    // Serializing a Value cannot fail; the write still can
    let updated = value.to_string();
    if let Err(e) = storage.set(ADMIN_SESSION, &updated) {
        warn!(error = %e, "could not persist liveness refresh");
    }
}

/// True when an invalid session under `path` must bounce to the login page
fn requires_redirect(path: &str) -> bool {
    path.starts_with(ADMIN_PATH_PREFIX) && !REDIRECT_EXEMPT_PATHS.contains(&path)
}

/// Run one enforcement pass over the persistent storage area, using the
/// transient area for the redirect slot.
///
/// Never fails: unexpected errors are logged and reported as
/// `Outcome::Skipped` with storage untouched beyond what already happened.
pub fn enforce(
    persistent: &mut dyn Storage,
    transient: &mut dyn Storage,
    page: &PageLocation,
    now: DateTime<Utc>,
) -> Outcome {
    match try_enforce(persistent, transient, page, now) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "admin session enforcement failed");
            Outcome::Skipped
        }
    }
}

fn try_enforce(
    persistent: &mut dyn Storage,
    transient: &mut dyn Storage,
    page: &PageLocation,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    match session::validate(persistent, now) {
        Validity::Valid => {
            debug!("valid admin session found, preserving authentication");
            refresh_last_activity(persistent, now);
            Ok(Outcome::Preserved)
        }
        Validity::Invalid(reason) => {
            info!(?reason, "invalid admin session detected, clearing");
            clear_invalid_auth(persistent);

            let redirect = if requires_redirect(&page.path) {
                let attempted = page.target();
                transient
                    .set(ADMIN_REDIRECT_URL, &attempted)
                    .context("failed to record redirect target")?;
                info!(%attempted, "redirecting to admin login page");
                Some(PendingRedirect {
                    attempted,
                    destination: LOGIN_PATH.to_string(),
                })
            } else {
                None
            };

            Ok(Outcome::Cleared { reason, redirect })
        }
    }
}

/// Fire the pending navigation after the fixed delay.
/// Fire-and-forget in the original; callers may spawn or await this.
pub async fn schedule_redirect(navigator: &dyn Navigator, redirect: &PendingRedirect) {
    tokio::time::sleep(std::time::Duration::from_millis(REDIRECT_DELAY_MS)).await;
    navigator.navigate(&redirect.destination);
}
