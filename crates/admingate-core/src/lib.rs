//! admingate - admin session validation over an injected key-value store.
//!
//! The library decides whether a persisted admin credential bundle is still
//! valid and enforces the outcome: refresh the liveness timestamp when it
//! is, purge all auth material and plan a login redirect when it is not.
//!
//! Modules:
//! - `storage`: the key-value seam plus memory and file backends
//! - `auth`: token decoding and credential-bundle validation
//! - `guard`: the once-per-page-load enforcement flow
//! - `report`: read-only diagnostics snapshot
//! - `keys`: every storage key and guard constant in one place

pub mod auth;
pub mod guard;
pub mod keys;
pub mod report;
pub mod storage;

pub use auth::{InvalidReason, TokenError, Validity};
pub use guard::{enforce, schedule_redirect, Navigator, Outcome, PageLocation, PendingRedirect};
pub use report::SessionReport;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
