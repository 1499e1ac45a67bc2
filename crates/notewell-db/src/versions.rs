//! Version history repository: retention engine and restore coordinator.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use notewell_core::{
    excess_snapshots, Error, Note, Result, VersionSnapshot, RETENTION_LIMIT,
};

/// PostgreSQL repository for note version snapshots.
pub struct PgVersionRepository {
    pool: Pool<Postgres>,
}

const SNAPSHOT_COLUMNS: &str =
    "id, note_id, version, title, content, tags, is_archived, created_at_utc";

impl PgVersionRepository {
    /// Create a new PgVersionRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Snapshot the given pre-update note state, then prune history back
    /// down to the retention limit.
    ///
    /// The snapshot records the note's *current* (pre-increment) version
    /// number. If the count afterwards exceeds [`RETENTION_LIMIT`], the
    /// excess oldest snapshots (by creation time, UUIDv7 id as tiebreaker)
    /// are deleted. Returns the number of snapshots pruned.
    ///
    /// Version history is auxiliary to the note itself: callers log
    /// failures from this method and carry on, they never roll back the
    /// already-persisted note update.
    pub async fn snapshot_and_prune(&self, before: &Note) -> Result<u64> {
        let snapshot = VersionSnapshot::of(before, Utc::now());

        sqlx::query(
            "INSERT INTO note_version (id, note_id, version, title, content, tags,
                                       is_archived, created_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(snapshot.id)
        .bind(snapshot.note_id)
        .bind(snapshot.version)
        .bind(&snapshot.title)
        .bind(&snapshot.content)
        .bind(&snapshot.tags)
        .bind(snapshot.is_archived)
        .bind(snapshot.created_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM note_version WHERE note_id = $1")
                .bind(before.id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;

        let excess = excess_snapshots(count, RETENTION_LIMIT);
        if excess == 0 {
            return Ok(0);
        }

        let oldest_ids: Vec<Uuid> = sqlx::query(
            "SELECT id FROM note_version WHERE note_id = $1
             ORDER BY created_at_utc ASC, id ASC LIMIT $2",
        )
        .bind(before.id)
        .bind(excess)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|r| r.get("id"))
        .collect();

        let result = sqlx::query("DELETE FROM note_version WHERE id = ANY($1)")
            .bind(&oldest_ids)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        tracing::debug!(
            subsystem = "db",
            component = "versions",
            op = "snapshot_and_prune",
            note_id = %before.id,
            pruned_count = result.rows_affected(),
            "Pruned version history to retention limit"
        );

        Ok(result.rows_affected())
    }

    /// List all snapshots for a note.
    ///
    /// Zero snapshots is surfaced as NotFound, not an empty list — this
    /// holds even for notes that have never been edited.
    pub async fn list_for_note(&self, note_id: Uuid) -> Result<Vec<VersionSnapshot>> {
        let versions = sqlx::query_as::<_, VersionSnapshot>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM note_version WHERE note_id = $1
             ORDER BY created_at_utc ASC"
        ))
        .bind(note_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        if versions.is_empty() {
            return Err(Error::NotFound(format!(
                "No versions found for note {}",
                note_id
            )));
        }

        Ok(versions)
    }

    /// Fetch a single snapshot by id.
    pub async fn fetch(&self, version_id: Uuid) -> Result<VersionSnapshot> {
        sqlx::query_as::<_, VersionSnapshot>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM note_version WHERE id = $1"
        ))
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("Version {} not found", version_id)))
    }

    /// Restore a note to the state recorded in a snapshot, consuming it.
    ///
    /// The snapshot is looked up first; the note lookup is fused with the
    /// requesting user's ownership. Title, content, tags, archive flag, and
    /// version are all overwritten from the snapshot (the version may move
    /// backwards), then the consumed snapshot is deleted — there is no redo.
    pub async fn restore(&self, version_id: Uuid, user_id: Uuid) -> Result<Note> {
        let snapshot = self.fetch(version_id).await?;

        let note = sqlx::query_as::<_, Note>(
            "SELECT id, user_id, title, content, tags, version, is_archived,
                    created_at_utc, updated_at_utc
             FROM note WHERE id = $1 AND user_id = $2",
        )
        .bind(snapshot.note_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("Note {} not found", snapshot.note_id)))?;

        let restored = note.restore_from(&snapshot, Utc::now());

        sqlx::query(
            "UPDATE note SET title = $1, content = $2, tags = $3, is_archived = $4,
                             version = $5, updated_at_utc = $6
             WHERE id = $7",
        )
        .bind(&restored.title)
        .bind(&restored.content)
        .bind(&restored.tags)
        .bind(restored.is_archived)
        .bind(restored.version)
        .bind(restored.updated_at_utc)
        .bind(restored.id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        sqlx::query("DELETE FROM note_version WHERE id = $1")
            .bind(snapshot.id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        tracing::info!(
            subsystem = "db",
            component = "versions",
            op = "restore",
            note_id = %restored.id,
            version_id = %snapshot.id,
            version = restored.version,
            "Restored note from snapshot"
        );

        Ok(restored)
    }

    /// Bulk-delete every snapshot for a note.
    ///
    /// Does not verify ownership of the note itself (longstanding behavior,
    /// see DESIGN.md). NotFound when there was nothing to delete.
    pub async fn delete_all_for_note(&self, note_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM note_version WHERE note_id = $1")
            .bind(note_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "No versions found to delete for note {}",
                note_id
            )));
        }

        Ok(result.rows_affected())
    }
}
