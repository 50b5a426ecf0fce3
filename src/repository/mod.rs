use async_trait::async_trait;
use crate::domain::*;
use crate::error::Result;

pub mod announcement_repository;
pub mod fetch_status_repository;
pub mod quiz_repository;
pub mod user_repository;

pub use announcement_repository::SqliteAnnouncementRepository;
pub use fetch_status_repository::SqliteFetchStatusRepository;
pub use quiz_repository::SqliteQuizRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, quiz_id: i64, content: &str, created_by: Option<i64>, time_posted: i64) -> Result<Announcement>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>>;
    /// All announcements for the quiz, oldest first.
    async fn list_for_quiz(&self, quiz_id: i64) -> Result<Vec<Announcement>>;
    /// Announcements with `time_posted >= since`, oldest first.
    async fn list_since(&self, quiz_id: i64, since: i64) -> Result<Vec<Announcement>>;
    async fn latest_time_posted(&self, quiz_id: i64) -> Result<Option<i64>>;
    async fn count_for_quiz(&self, quiz_id: i64) -> Result<i64>;
    async fn delete(&self, id: i64) -> Result<()>;
    /// Deletes every announcement of the quiz and returns the removed ids.
    async fn delete_all_for_quiz(&self, quiz_id: i64) -> Result<Vec<i64>>;
}

#[async_trait]
pub trait FetchStatusRepository: Send + Sync {
    async fn find(&self, quiz_id: i64, user_id: i64) -> Result<Option<FetchStatus>>;
    /// Atomically creates or advances the student's record for a fetch at `now`.
    /// When no record exists and `create` is false nothing is written.
    async fn record_fetch(
        &self,
        quiz_id: i64,
        user_id: i64,
        now: i64,
        reannounce_window: i64,
        create: bool,
    ) -> Result<FetchUpdate>;
    /// Records for the quiz, least recently fetched first.
    async fn list_for_quiz(&self, quiz_id: i64) -> Result<Vec<FetchStatus>>;
    async fn delete(&self, quiz_id: i64, user_id: i64) -> Result<bool>;
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create_quiz(&self, name: &str) -> Result<Quiz>;
    async fn find_quiz(&self, id: i64) -> Result<Option<Quiz>>;
    async fn find_settings(&self, quiz_id: i64) -> Result<Option<QuizSettings>>;
    async fn save_settings(&self, settings: &QuizSettings) -> Result<QuizSettings>;
    /// Removes the settings row together with the quiz's announcements and
    /// fetch statuses, in one transaction.
    async fn delete_settings(&self, quiz_id: i64) -> Result<()>;
    async fn enrol(&self, quiz_id: i64, user_id: i64, role: QuizRole) -> Result<()>;
    async fn role_of(&self, quiz_id: i64, user_id: i64) -> Result<Option<QuizRole>>;
    /// Users enrolled as students, ordered by full name.
    async fn list_students(&self, quiz_id: i64) -> Result<Vec<User>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    /// The user together with their stored password hash, for login.
    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>>;
}
