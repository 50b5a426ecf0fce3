use std::sync::Arc;

use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{AuditEntry, AuditEvent},
    error::Result,
};
use super::clock::Clock;

#[derive(FromRow)]
struct AuditRow {
    id: i64,
    quiz_id: i64,
    user_id: Option<i64>,
    event: String,
    object_id: Option<i64>,
    created_at: i64,
}

/// Audit trail of announcement activity, persisted and mirrored to the log.
pub struct AuditLog {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl AuditLog {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub async fn record(
        &self,
        quiz_id: i64,
        user_id: Option<i64>,
        event: AuditEvent,
        object_id: Option<i64>,
    ) -> Result<()> {
        tracing::info!(quiz_id, ?user_id, ?object_id, event = event.as_str(), "Audit");

        sqlx::query(
            r#"
            INSERT INTO audit_log (quiz_id, user_id, event, object_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#
        )
        .bind(quiz_id)
        .bind(user_id)
        .bind(event.as_str())
        .bind(object_id)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Entries for the quiz, oldest first.
    pub async fn list_for_quiz(&self, quiz_id: i64) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, quiz_id, user_id, event, object_id, created_at
            FROM audit_log
            WHERE quiz_id = ?
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AuditEntry {
                id: row.id,
                quiz_id: row.quiz_id,
                user_id: row.user_id,
                event: row.event,
                object_id: row.object_id,
                created_at: row.created_at,
            })
            .collect())
    }
}
