//! Authentication primitives for the admin session guard.
//!
//! This module provides:
//! - `token`: segmented access-token decoding and expiry/role validation
//! - `session`: credential-bundle validation with typed rejection reasons

pub mod session;
pub mod token;

pub use session::{AdminData, AdminSession, InvalidReason, Validity};
pub use token::{TokenClaims, TokenError};
