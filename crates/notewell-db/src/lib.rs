//! # notewell-db
//!
//! PostgreSQL database layer for notewell.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, notes, version history, and
//!   bearer tokens
//! - The version retention engine (snapshot-and-prune) and restore logic
//!
//! ## Example
//!
//! ```rust,ignore
//! use notewell_db::Database;
//! use notewell_core::CreateNoteRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/notewell").await?;
//!
//!     let note = db.notes.insert(user_id, CreateNoteRequest {
//!         title: "Hello".to_string(),
//!         content: "world".to_string(),
//!         tags: None,
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod pool;
pub mod tokens;
pub mod users;
pub mod versions;

#[cfg(test)]
mod tests;

// Test fixtures for the database integration tests
#[cfg(test)]
pub mod test_fixtures;

// Re-export core types
pub use notewell_core::*;

// Re-export repository implementations
pub use notes::{NoteUpdate, PgNoteRepository};
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use tokens::PgTokenRepository;
pub use users::PgUserRepository;
pub use versions::PgVersionRepository;

/// Combined database context with all repositories.
///
/// Constructed once at process start from a single connection pool and
/// passed into the components that need it — there is no lazily
/// initialized global connection holder, which keeps test substitution
/// straightforward.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User account repository.
    pub users: PgUserRepository,
    /// Note repository for lifecycle operations.
    pub notes: PgNoteRepository,
    /// Version history repository (retention engine + restore).
    pub versions: PgVersionRepository,
    /// Bearer token repository.
    pub tokens: PgTokenRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            versions: PgVersionRepository::new(pool.clone()),
            tokens: PgTokenRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
