//! Storage key names and guard constants.
//!
//! Every key the validator reads, writes, or purges is named here so the
//! clearing logic and the tests agree on the exact set.

/// Key holding the admin access token (opaque string or 3-segment token)
pub const ADMIN_TOKEN: &str = "adminToken";

/// Key holding the admin metadata JSON (role, id, lastLogin)
pub const ADMIN_DATA: &str = "adminData";

/// Key holding the optional session JSON (expiresAt, lastActivity)
pub const ADMIN_SESSION: &str = "adminSession";

/// Key holding the failed-login counter
pub const ADMIN_LOGIN_ATTEMPTS: &str = "adminLoginAttempts";

/// Key holding the lockout-until timestamp
pub const ADMIN_LOCKOUT_UNTIL: &str = "adminLockoutUntil";

/// Transient slot recording the path the user was trying to reach
/// before being sent to the login page
pub const ADMIN_REDIRECT_URL: &str = "adminRedirectURL";

/// Prefix for stored biometric enrollment data; every key carrying it
/// is purged on invalidation
pub const BIOMETRIC_PREFIX: &str = "biometric_";

/// Auth keys from earlier releases, purged alongside the admin namespace
pub const LEGACY_KEYS: [&str; 4] = ["userRole", "token", "authToken", "adminRole"];

/// Fixed admin-namespace keys removed on invalidation
pub const ADMIN_KEYS: [&str; 5] = [
    ADMIN_TOKEN,
    ADMIN_DATA,
    ADMIN_SESSION,
    ADMIN_LOGIN_ATTEMPTS,
    ADMIN_LOCKOUT_UNTIL,
];

/// Path prefix of the protected admin namespace
pub const ADMIN_PATH_PREFIX: &str = "/admin";

/// Login page an invalidated session is redirected to
pub const LOGIN_PATH: &str = "/admin-secure-login";

/// Admin-adjacent paths that never trigger a redirect: the login pages,
/// the login-info page, and the bare admin root
pub const REDIRECT_EXEMPT_PATHS: [&str; 4] = [
    LOGIN_PATH,
    "/admin-login-info",
    "/admin",
    "/admin-login",
];

/// Grace window after token expiry, in seconds.
/// Tolerates clock skew between the token issuer and the client.
pub const TOKEN_EXPIRY_GRACE_SECS: i64 = 5 * 60;

/// Delay before navigating to the login page, in milliseconds.
/// Gives the current page a moment to finish loading first.
pub const REDIRECT_DELAY_MS: u64 = 100;
