//! Domain models for notes, version snapshots, users, and principals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::INITIAL_VERSION;

// =============================================================================
// NOTES
// =============================================================================

/// A user-owned note with a monotonically increasing version counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub version: i32,
    pub is_archived: bool,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

impl Note {
    /// Construct a fresh note for `user_id` from a create request.
    ///
    /// Starts at version 1, unarchived, with tags defaulted to empty.
    pub fn new(user_id: Uuid, req: CreateNoteRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: crate::new_v7(),
            user_id,
            title: req.title,
            content: req.content,
            tags: req.tags.unwrap_or_default(),
            version: INITIAL_VERSION,
            is_archived: false,
            created_at_utc: now,
            updated_at_utc: now,
        }
    }

    /// Compute the post-update state for a partial update request.
    ///
    /// Each omitted field keeps its prior value (null-coalescing merge, not
    /// replacement). The version is bumped by exactly 1. The receiver is the
    /// pre-update state and is left untouched so the caller can hand it to
    /// the retention engine for snapshotting.
    pub fn apply_update(&self, req: UpdateNoteRequest, now: DateTime<Utc>) -> Note {
        Note {
            id: self.id,
            user_id: self.user_id,
            title: req.title.unwrap_or_else(|| self.title.clone()),
            content: req.content.unwrap_or_else(|| self.content.clone()),
            tags: req.tags.unwrap_or_else(|| self.tags.clone()),
            is_archived: req.is_archived.unwrap_or(self.is_archived),
            version: self.version + 1,
            created_at_utc: self.created_at_utc,
            updated_at_utc: now,
        }
    }

    /// Compute the state after restoring from a snapshot.
    ///
    /// Title, content, tags, archive flag, and version all come from the
    /// snapshot; the version may therefore move backwards.
    pub fn restore_from(&self, snapshot: &VersionSnapshot, now: DateTime<Utc>) -> Note {
        Note {
            id: self.id,
            user_id: self.user_id,
            title: snapshot.title.clone(),
            content: snapshot.content.clone(),
            tags: snapshot.tags.clone(),
            is_archived: snapshot.is_archived,
            version: snapshot.version,
            created_at_utc: self.created_at_utc,
            updated_at_utc: now,
        }
    }
}

/// A note joined with its version history, as returned by get-by-id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteWithVersions {
    #[serde(flatten)]
    pub note: Note,
    pub versions: Vec<VersionSnapshot>,
}

/// Request to create a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub tags: Option<Vec<String>>,
}

impl CreateNoteRequest {
    /// Reject empty required fields before touching the store.
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::Error::InvalidInput("title is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "content is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update request; omitted fields keep their prior values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_archived: Option<bool>,
}

// =============================================================================
// VERSION SNAPSHOTS
// =============================================================================

/// An immutable recorded prior state of a note.
///
/// The `version` field is the note's version number *at the time the
/// snapshot was taken*, i.e. the pre-update value: a snapshot recording
/// version N means "the state while the note was at version N, before it
/// became N+1".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VersionSnapshot {
    pub id: Uuid,
    pub note_id: Uuid,
    pub version: i32,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_archived: bool,
    pub created_at_utc: DateTime<Utc>,
}

impl VersionSnapshot {
    /// Record the given (pre-update) note state as a snapshot.
    pub fn of(note: &Note, now: DateTime<Utc>) -> Self {
        Self {
            id: crate::new_v7(),
            note_id: note.id,
            version: note.version,
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
            is_archived: note.is_archived,
            created_at_utc: now,
        }
    }
}

/// How many snapshots must be pruned to respect the retention limit.
pub fn excess_snapshots(count: i64, limit: i64) -> i64 {
    (count - limit).max(0)
}

// =============================================================================
// USERS & AUTH
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// The authenticated identity attached to a request.
///
/// Produced per request by the API layer's auth extractor from a validated
/// bearer credential; never persisted. Threading this through operation
/// signatures makes "requires authentication" explicit in the types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPrincipal {
    pub user_id: Uuid,
    pub email: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> crate::Result<()> {
        if self.username.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "username is required".to_string(),
            ));
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(crate::Error::InvalidInput(
                "a valid email is required".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(crate::Error::InvalidInput(
                "password is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
