//! Bearer token repository implementation.
//!
//! Login mints an opaque `nw_tk_` token; only its SHA-256 hash is stored,
//! alongside the owning user and an expiry. Validation resolves the hash
//! back to an [`AuthPrincipal`].

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use notewell_core::defaults::{TOKEN_PREFIX, TOKEN_SECRET_LEN, TOKEN_TTL_SECS};
use notewell_core::{new_v7, AuthPrincipal, Error, Result, User};

/// PostgreSQL implementation of the bearer token repository.
pub struct PgTokenRepository {
    pool: Pool<Postgres>,
}

impl PgTokenRepository {
    /// Create a new PgTokenRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure random string.
    fn generate_secret(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a secret using SHA256.
    fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Mint a new bearer token for a user.
    ///
    /// The plaintext token is returned exactly once; only its hash is
    /// persisted. Expired tokens for any user are swept opportunistically
    /// on each issue.
    pub async fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();

        sqlx::query("DELETE FROM auth_token WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let token = format!("{}{}", TOKEN_PREFIX, Self::generate_secret(TOKEN_SECRET_LEN));
        let token_hash = Self::hash_secret(&token);
        let expires_at = now + Duration::seconds(TOKEN_TTL_SECS);

        sqlx::query(
            "INSERT INTO auth_token (id, user_id, token_hash, expires_at, created_at_utc)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(new_v7())
        .bind(user.id)
        .bind(&token_hash)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(token)
    }

    /// Validate a presented bearer token.
    ///
    /// Returns the principal for a live token, `None` for unknown, expired,
    /// or malformed tokens. The principal's email comes from the owning
    /// user row, so a deleted account invalidates its tokens immediately.
    pub async fn validate(&self, token: &str) -> Result<Option<AuthPrincipal>> {
        if !token.starts_with(TOKEN_PREFIX) {
            return Ok(None);
        }
        let token_hash = Self::hash_secret(token);

        let row = sqlx::query(
            "SELECT t.user_id, u.email
             FROM auth_token t
             JOIN app_user u ON u.id = t.user_id
             WHERE t.token_hash = $1 AND t.expires_at > $2",
        )
        .bind(&token_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| AuthPrincipal {
            user_id: r.get::<Uuid, _>("user_id"),
            email: r.get("email"),
        }))
    }

    /// Revoke every token belonging to a user.
    pub async fn revoke_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM auth_token WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_length_and_charset() {
        let secret = PgTokenRepository::generate_secret(48);
        assert_eq!(secret.len(), 48);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_secret_is_random() {
        let a = PgTokenRepository::generate_secret(32);
        let b = PgTokenRepository::generate_secret(32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_secret_is_hex_sha256() {
        let hash = PgTokenRepository::hash_secret("nw_tk_example");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // Deterministic
        assert_eq!(hash, PgTokenRepository::hash_secret("nw_tk_example"));
    }
}
