//! Login sessions
//!
//! The client holds a random bearer token; the table only stores its SHA-256
//! digest, so a leaked database cannot be replayed as cookies.

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqliteConnection;
use tracing::instrument;

use super::dao::require_saved;
use super::{DaoError, DaoResult};
use crate::entities::{Identity, Key, User};

/// Generate a 256-bit random session token, base64url without padding
pub fn generate_token() -> String {
    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill(&mut token_bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}

/// Hex SHA-256 of a token, as stored in `sessions.token_hash`
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct Sessions<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Open a session for `user` lasting `ttl`; returns the plaintext token
    #[instrument(skip(self), fields(user = %user), err)]
    pub async fn open(&mut self, user: Identity, ttl: Duration) -> DaoResult<String> {
        let user_key = require_saved::<User>(user)?;
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| DaoError::SessionLifetime(ttl.to_string()))?;
        let token = generate_token();

        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token_digest(&token))
        .bind(user_key)
        .bind(now.timestamp())
        .bind(expires_at.timestamp())
        .execute(&mut *self.db)
        .await?;

        Ok(token)
    }

    /// Key of the user owning an unexpired session, if any
    pub async fn resolve(&mut self, token: &str) -> DaoResult<Option<Key>> {
        let user_key: Option<i64> = sqlx::query_scalar(
            "SELECT user_id FROM sessions WHERE token_hash = ? AND expires_at > ?",
        )
        .bind(token_digest(token))
        .bind(Utc::now().timestamp())
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(user_key)
    }

    /// Forget a session; closing an unknown token is not an error
    pub async fn close(&mut self, token: &str) -> DaoResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_digest(token))
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }

    /// Drop every expired session, returning how many were removed
    pub async fn purge_expired(&mut self) -> DaoResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().timestamp())
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
