//! Note repository implementation.

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use notewell_core::{
    CreateNoteRequest, Error, Note, NoteWithVersions, Result, UpdateNoteRequest, VersionSnapshot,
};

/// Result of a note update: the persisted post-update state plus the
/// pre-update state the caller must hand to the retention engine.
///
/// Returning the prior state explicitly (instead of relying on call-order
/// convention) guarantees snapshots are always taken from what the note
/// looked like before the merge was persisted.
#[derive(Debug, Clone)]
pub struct NoteUpdate {
    /// The note as it was before this update.
    pub before: Note,
    /// The merged, persisted note.
    pub after: Note,
}

/// PostgreSQL implementation of the note lifecycle operations.
///
/// Every lookup that takes a `user_id` filters by `id AND user_id` in a
/// single query: ownership and existence are checked atomically, and a
/// non-owner probing a foreign note id gets the same NotFound as a
/// nonexistent id. Existence is never leaked.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

const NOTE_COLUMNS: &str =
    "id, user_id, title, content, tags, version, is_archived, created_at_utc, updated_at_utc";

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all notes owned by a user, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE user_id = $1 ORDER BY created_at_utc DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(notes)
    }

    /// Fetch a note by id, scoped to its owner.
    pub async fn fetch_owned(&self, id: Uuid, user_id: Uuid) -> Result<Note> {
        sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))
    }

    /// Fetch a note eagerly joined with its version snapshots.
    pub async fn fetch_with_versions(&self, id: Uuid, user_id: Uuid) -> Result<NoteWithVersions> {
        let note = self.fetch_owned(id, user_id).await?;

        let versions = sqlx::query_as::<_, VersionSnapshot>(
            "SELECT id, note_id, version, title, content, tags, is_archived, created_at_utc
             FROM note_version WHERE note_id = $1 ORDER BY created_at_utc ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(NoteWithVersions { note, versions })
    }

    /// Insert a new note for a user.
    pub async fn insert(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        req.validate()?;
        let note = Note::new(user_id, req, Utc::now());

        sqlx::query(
            "INSERT INTO note (id, user_id, title, content, tags, version, is_archived,
                               created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(note.id)
        .bind(note.user_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.tags)
        .bind(note.version)
        .bind(note.is_archived)
        .bind(note.created_at_utc)
        .bind(note.updated_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(note)
    }

    /// Apply a partial update to an owned note.
    ///
    /// Loads the current state (fused id+owner filter), merges omitted
    /// fields from prior values, bumps the version by exactly 1, and
    /// persists the result. The returned [`NoteUpdate`] carries the
    /// pre-update state for snapshotting; persisting the snapshot is the
    /// caller's responsibility and must not roll this update back.
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        req: UpdateNoteRequest,
    ) -> Result<NoteUpdate> {
        let before = self.fetch_owned(id, user_id).await?;
        let after = before.apply_update(req, Utc::now());

        sqlx::query(
            "UPDATE note SET title = $1, content = $2, tags = $3, is_archived = $4,
                             version = $5, updated_at_utc = $6
             WHERE id = $7",
        )
        .bind(&after.title)
        .bind(&after.content)
        .bind(&after.tags)
        .bind(after.is_archived)
        .bind(after.version)
        .bind(after.updated_at_utc)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(NoteUpdate { before, after })
    }

    /// Delete an owned note and all of its version snapshots.
    ///
    /// The note row goes first, then the snapshots. A crash between the two
    /// statements can leave orphaned snapshots behind; they are meaningless
    /// without their note and unreachable through any read path, so this is
    /// an accepted eventual-consistency gap rather than a transaction.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }

        sqlx::query("DELETE FROM note_version WHERE note_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }

    /// Mark an owned note as archived.
    ///
    /// Archiving is not a content edit: the version counter stays put and
    /// no snapshot is taken.
    pub async fn archive(&self, id: Uuid, user_id: Uuid) -> Result<Note> {
        let mut note = self.fetch_owned(id, user_id).await?;
        let now = Utc::now();

        sqlx::query("UPDATE note SET is_archived = true, updated_at_utc = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        note.is_archived = true;
        note.updated_at_utc = now;
        Ok(note)
    }
}
