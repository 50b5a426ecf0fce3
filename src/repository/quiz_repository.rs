use async_trait::async_trait;
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::{Quiz, QuizRole, QuizSettings, User},
    error::{AppError, Result},
    repository::QuizRepository,
};

#[derive(FromRow)]
struct QuizRow {
    id: i64,
    name: String,
}

#[derive(FromRow)]
struct QuizSettingsRow {
    quiz_id: i64,
    use_announcements: i32,
    check_interval: i64,
    header: String,
}

#[derive(FromRow)]
struct StudentRow {
    id: i64,
    username: String,
    full_name: String,
}

pub struct SqliteQuizRepository {
    pool: SqlitePool,
}

impl SqliteQuizRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_settings(row: QuizSettingsRow) -> QuizSettings {
        QuizSettings {
            quiz_id: row.quiz_id,
            use_announcements: row.use_announcements != 0,
            check_interval: row.check_interval,
            header: row.header,
        }
    }
}

#[async_trait]
impl QuizRepository for SqliteQuizRepository {
    async fn create_quiz(&self, name: &str) -> Result<Quiz> {
        let id = sqlx::query("INSERT INTO quizzes (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(Quiz { id, name: name.to_string() })
    }

    async fn find_quiz(&self, id: i64) -> Result<Option<Quiz>> {
        let row = sqlx::query_as::<_, QuizRow>("SELECT id, name FROM quizzes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Quiz { id: r.id, name: r.name }))
    }

    async fn find_settings(&self, quiz_id: i64) -> Result<Option<QuizSettings>> {
        let row = sqlx::query_as::<_, QuizSettingsRow>(
            r#"
            SELECT quiz_id, use_announcements, check_interval, header
            FROM quiz_settings
            WHERE quiz_id = ?
            "#
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Self::row_to_settings))
    }

    async fn save_settings(&self, settings: &QuizSettings) -> Result<QuizSettings> {
        let use_int = if settings.use_announcements { 1i32 } else { 0i32 };

        sqlx::query(
            r#"
            INSERT INTO quiz_settings (quiz_id, use_announcements, check_interval, header)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(quiz_id) DO UPDATE SET
                use_announcements = excluded.use_announcements,
                check_interval = excluded.check_interval,
                header = excluded.header
            "#
        )
        .bind(settings.quiz_id)
        .bind(use_int)
        .bind(settings.check_interval)
        .bind(&settings.header)
        .execute(&self.pool)
        .await?;

        self.find_settings(settings.quiz_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve saved quiz settings".to_string())
        })
    }

    async fn delete_settings(&self, quiz_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Announcements first, then student status, then the settings row.
        sqlx::query("DELETE FROM announcements WHERE quiz_id = ?")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM fetch_status WHERE quiz_id = ?")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM quiz_settings WHERE quiz_id = ?")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn enrol(&self, quiz_id: i64, user_id: i64, role: QuizRole) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quiz_roles (quiz_id, user_id, role)
            VALUES (?, ?, ?)
            ON CONFLICT(quiz_id, user_id) DO UPDATE SET role = excluded.role
            "#
        )
        .bind(quiz_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn role_of(&self, quiz_id: i64, user_id: i64) -> Result<Option<QuizRole>> {
        let role = sqlx::query_scalar::<_, String>(
            "SELECT role FROM quiz_roles WHERE quiz_id = ? AND user_id = ?"
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match role {
            Some(r) => QuizRole::parse(&r)
                .map(Some)
                .ok_or_else(|| AppError::Database(format!("Invalid quiz role: {}", r))),
            None => Ok(None),
        }
    }

    async fn list_students(&self, quiz_id: i64) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, StudentRow>(
            r#"
            SELECT u.id, u.username, u.full_name
            FROM users u
            JOIN quiz_roles r ON r.user_id = u.id
            WHERE r.quiz_id = ? AND r.role = ?
            ORDER BY u.full_name, u.id
            "#
        )
        .bind(quiz_id)
        .bind(QuizRole::Student.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| User { id: r.id, username: r.username, full_name: r.full_name })
            .collect())
    }
}
