//! Structured logging schema and field name constants for notewell.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated per request. Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event. Values: "api", "db", "auth".
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem. Examples: "pool", "notes", "versions".
pub const COMPONENT: &str = "component";

/// Logical operation name. Examples: "update", "snapshot_and_prune".
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Version snapshot UUID being operated on.
pub const VERSION_ID: &str = "version_id";

/// Acting user UUID.
pub const USER_ID: &str = "user_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of snapshots pruned by a retention pass.
pub const PRUNED_COUNT: &str = "pruned_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
