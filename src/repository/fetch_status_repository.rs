use async_trait::async_trait;
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::{FetchStatus, FetchUpdate},
    error::Result,
    repository::FetchStatusRepository,
};

#[derive(FromRow)]
struct FetchStatusRow {
    quiz_id: i64,
    user_id: i64,
    time_fetched: i64,
    previous_fetch: i64,
}

impl From<FetchStatusRow> for FetchStatus {
    fn from(row: FetchStatusRow) -> Self {
        FetchStatus {
            quiz_id: row.quiz_id,
            user_id: row.user_id,
            time_fetched: row.time_fetched,
            previous_fetch: row.previous_fetch,
        }
    }
}

pub struct SqliteFetchStatusRepository {
    pool: SqlitePool,
}

impl SqliteFetchStatusRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FetchStatusRepository for SqliteFetchStatusRepository {
    async fn find(&self, quiz_id: i64, user_id: i64) -> Result<Option<FetchStatus>> {
        let row = sqlx::query_as::<_, FetchStatusRow>(
            r#"
            SELECT quiz_id, user_id, time_fetched, previous_fetch
            FROM fetch_status
            WHERE quiz_id = ? AND user_id = ?
            "#
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(FetchStatus::from))
    }

    async fn record_fetch(
        &self,
        quiz_id: i64,
        user_id: i64,
        now: i64,
        reannounce_window: i64,
        create: bool,
    ) -> Result<FetchUpdate> {
        let mut tx = self.pool.begin().await?;

        // Insert before reading: concurrent first fetches then serialize on
        // the write lock and the later one advances the row instead.
        if create {
            let first = FetchStatus::first(quiz_id, user_id, now);
            let inserted = sqlx::query(
                r#"
                INSERT INTO fetch_status (quiz_id, user_id, time_fetched, previous_fetch)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (quiz_id, user_id) DO NOTHING
                "#
            )
            .bind(quiz_id)
            .bind(user_id)
            .bind(first.time_fetched)
            .bind(first.previous_fetch)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if inserted > 0 {
                tx.commit().await?;
                return Ok(FetchUpdate::Created(first));
            }
        }

        let existing = sqlx::query_as::<_, FetchStatusRow>(
            r#"
            SELECT quiz_id, user_id, time_fetched, previous_fetch
            FROM fetch_status
            WHERE quiz_id = ? AND user_id = ?
            "#
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let update = match existing {
            Some(row) => {
                let mut status = FetchStatus::from(row);
                let boundary = status.advance(now, reannounce_window);

                sqlx::query(
                    r#"
                    UPDATE fetch_status
                    SET time_fetched = ?, previous_fetch = ?
                    WHERE quiz_id = ? AND user_id = ?
                    "#
                )
                .bind(status.time_fetched)
                .bind(status.previous_fetch)
                .bind(quiz_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

                FetchUpdate::Advanced { boundary, status }
            }
            None => FetchUpdate::Untracked,
        };

        tx.commit().await?;

        Ok(update)
    }

    async fn list_for_quiz(&self, quiz_id: i64) -> Result<Vec<FetchStatus>> {
        let rows = sqlx::query_as::<_, FetchStatusRow>(
            r#"
            SELECT quiz_id, user_id, time_fetched, previous_fetch
            FROM fetch_status
            WHERE quiz_id = ?
            ORDER BY time_fetched ASC, user_id ASC
            "#
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FetchStatus::from).collect())
    }

    async fn delete(&self, quiz_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM fetch_status WHERE quiz_id = ? AND user_id = ?")
            .bind(quiz_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
