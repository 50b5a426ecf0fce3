use async_trait::async_trait;
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::Announcement,
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: i64,
    quiz_id: i64,
    content: String,
    time_posted: i64,
    created_by: Option<i64>,
}

impl From<AnnouncementRow> for Announcement {
    fn from(row: AnnouncementRow) -> Self {
        Announcement {
            id: row.id,
            quiz_id: row.quiz_id,
            content: row.content,
            time_posted: row.time_posted,
            created_by: row.created_by,
        }
    }
}

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, quiz_id: i64, content: &str, created_by: Option<i64>, time_posted: i64) -> Result<Announcement> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO announcements (quiz_id, content, time_posted, created_by)
            VALUES (?, ?, ?, ?)
            "#
        )
        .bind(quiz_id)
        .bind(content)
        .bind(time_posted)
        .bind(created_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .last_insert_rowid();

        let row = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, quiz_id, content, time_posted, created_by
            FROM announcements
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, quiz_id, content, time_posted, created_by
            FROM announcements
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(Announcement::from))
    }

    async fn list_for_quiz(&self, quiz_id: i64) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, quiz_id, content, time_posted, created_by
            FROM announcements
            WHERE quiz_id = ?
            ORDER BY time_posted ASC, id ASC
            "#
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Announcement::from).collect())
    }

    async fn list_since(&self, quiz_id: i64, since: i64) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, quiz_id, content, time_posted, created_by
            FROM announcements
            WHERE quiz_id = ? AND time_posted >= ?
            ORDER BY time_posted ASC, id ASC
            "#
        )
        .bind(quiz_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Announcement::from).collect())
    }

    async fn latest_time_posted(&self, quiz_id: i64) -> Result<Option<i64>> {
        let latest = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MAX(time_posted) FROM announcements WHERE quiz_id = ?"
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(latest)
    }

    async fn count_for_quiz(&self, quiz_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM announcements WHERE quiz_id = ?"
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_all_for_quiz(&self, quiz_id: i64) -> Result<Vec<i64>> {
        let mut tx = self.pool.begin().await?;

        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM announcements WHERE quiz_id = ? ORDER BY id"
        )
        .bind(quiz_id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM announcements WHERE quiz_id = ?")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ids)
    }
}
