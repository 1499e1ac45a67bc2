//! Centralized default constants for the notewell system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Other crates reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// VERSION HISTORY
// =============================================================================

/// Maximum version snapshots retained per note.
///
/// After any update-triggered prune, at most this many snapshots exist
/// for a note; the oldest are evicted first.
pub const RETENTION_LIMIT: i64 = 10;

/// First version number assigned to a freshly created note.
pub const INITIAL_VERSION: i32 = 1;

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Bearer token lifetime in seconds (1 hour).
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Prefix for opaque bearer tokens minted at login.
pub const TOKEN_PREFIX: &str = "nw_tk_";

/// Random character length of minted bearer tokens (excluding prefix).
pub const TOKEN_SECRET_LEN: usize = 48;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default rate limit: requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Maximum accepted request body in bytes (1 MB; notes are text).
pub const REQUEST_BODY_LIMIT: usize = 1024 * 1024;
