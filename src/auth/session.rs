//! Cookie sessions.
//!
//! A session is an opaque random token handed to the browser. Only its sha256
//! is stored, next to the user and an expiry in clock seconds.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::{error::Result, service::Clock};

pub struct SessionStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    ttl_secs: i64,
}

impl SessionStore {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, ttl_secs: i64) -> Self {
        Self { pool, clock, ttl_secs }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issues a new token for `user_id`.
    pub async fn open(&self, user_id: i64) -> Result<String> {
        let token = generate_token();

        sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(digest(&token))
            .bind(user_id)
            .bind(self.clock.now() + self.ttl_secs)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// The user behind a token that has not yet expired.
    pub async fn user_for(&self, token: &str) -> Result<Option<i64>> {
        let user_id = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM sessions WHERE token_hash = ? AND expires_at > ?"
        )
        .bind(digest(token))
        .bind(self.clock.now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }

    /// Returns whether a session was removed.
    pub async fn close(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(digest(token))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(self.clock.now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
