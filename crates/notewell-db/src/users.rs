//! User account repository implementation.

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use notewell_core::{new_v7, Error, RegisterRequest, Result, User};

/// PostgreSQL implementation of the user account repository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, created_at_utc, updated_at_utc";

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Register a new account, hashing the password with bcrypt.
    ///
    /// Duplicate usernames or emails surface as database unique-violation
    /// errors; the API layer maps those to Conflict.
    pub async fn create(&self, req: RegisterRequest) -> Result<User> {
        req.validate()?;

        let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
            .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;

        let now = Utc::now();
        let user = User {
            id: new_v7(),
            username: req.username,
            email: req.email,
            password_hash,
            created_at_utc: now,
            updated_at_utc: now,
        };

        sqlx::query(
            "INSERT INTO app_user (id, username, email, password_hash, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at_utc)
        .bind(user.updated_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(user)
    }

    /// Fetch a user by id.
    pub async fn fetch(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(user)
    }

    /// Look up a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(user)
    }

    /// Verify an email/password pair, returning the user on success.
    ///
    /// Unknown email and wrong password both yield `Ok(None)` so the login
    /// handler can emit one indistinguishable rejection message.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| Error::Internal(format!("password verification failed: {}", e)))?;

        Ok(matches.then_some(user))
    }
}
