#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use quizcast::{
    client::{ClientError, QuizTransport},
    config::Settings,
    domain::{AnnouncementsDelta, CreateUserRequest, QuizRole, QuizSettings, StudentStatusReport},
    repository::{QuizRepository, UserRepository},
    service::{ManualClock, ServiceContext},
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tempfile::TempDir;

pub const PASSWORD: &str = "password123";
pub const START: i64 = 1000;

pub struct TestApp {
    pub pool: SqlitePool,
    pub services: Arc<ServiceContext>,
    pub clock: Arc<ManualClock>,
    pub settings: Settings,
    pub quiz_id: i64,
    /// Editing teacher: may do everything.
    pub editor: i64,
    /// Non-editing teacher: may post and monitor but not delete or configure.
    pub teacher: i64,
    pub alice: i64,
    pub bob: i64,
    pub uploads: TempDir,
}

pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    // One connection that never recycles, so the in-memory database lives
    // as long as the pool.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

pub async fn setup() -> anyhow::Result<TestApp> {
    setup_with(|_| {}).await
}

pub async fn setup_with(configure: impl FnOnce(&mut Settings)) -> anyhow::Result<TestApp> {
    let pool = test_pool().await?;
    let uploads = tempfile::tempdir()?;

    let mut settings = Settings::default();
    settings.uploads.dir = uploads.path().to_string_lossy().into_owned();
    configure(&mut settings);

    let clock = Arc::new(ManualClock::new(START));
    let services = Arc::new(ServiceContext::new(pool.clone(), &settings, clock.clone()));

    let quiz = services.quiz_repo.create_quiz("Midterm").await?;
    services.quiz_repo.save_settings(&QuizSettings {
        quiz_id: quiz.id,
        use_announcements: true,
        check_interval: 30,
        header: "<h4>Announcements</h4>".to_string(),
    }).await?;

    let editor = create_user(&services, "editor", "Edith Editor").await?;
    let teacher = create_user(&services, "teacher", "Terry Teacher").await?;
    let alice = create_user(&services, "alice", "Alice Anders").await?;
    let bob = create_user(&services, "bob", "Bob Brown").await?;

    services.quiz_repo.enrol(quiz.id, editor, QuizRole::EditingTeacher).await?;
    services.quiz_repo.enrol(quiz.id, teacher, QuizRole::Teacher).await?;
    services.quiz_repo.enrol(quiz.id, alice, QuizRole::Student).await?;
    services.quiz_repo.enrol(quiz.id, bob, QuizRole::Student).await?;

    Ok(TestApp {
        pool,
        services,
        clock,
        settings,
        quiz_id: quiz.id,
        editor,
        teacher,
        alice,
        bob,
        uploads,
    })
}

pub async fn create_user(services: &ServiceContext, username: &str, full_name: &str) -> anyhow::Result<i64> {
    let user = services.user_repo.create(CreateUserRequest {
        username: username.to_string(),
        full_name: full_name.to_string(),
        password: PASSWORD.to_string(),
    }).await?;
    Ok(user.id)
}

/// Scripted transport for poller tests. Calls beyond the script succeed with
/// no content (announcements) or fail (status).
#[derive(Default)]
pub struct FakeTransport {
    pub announcements: Mutex<VecDeque<Result<AnnouncementsDelta, ClientError>>>,
    pub statuses: Mutex<VecDeque<Result<StudentStatusReport, ClientError>>>,
    pub lasttimes: Mutex<Vec<i64>>,
    pub status_calls: Mutex<usize>,
}

impl FakeTransport {
    pub fn push_announcements(&self, result: Result<AnnouncementsDelta, ClientError>) {
        self.announcements.lock().unwrap().push_back(result);
    }

    pub fn push_status(&self, result: Result<StudentStatusReport, ClientError>) {
        self.statuses.lock().unwrap().push_back(result);
    }

    pub fn lasttimes(&self) -> Vec<i64> {
        self.lasttimes.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> usize {
        *self.status_calls.lock().unwrap()
    }
}

pub fn unavailable() -> ClientError {
    ClientError::Status { status: 503, message: "Service Unavailable".to_string() }
}

#[async_trait]
impl QuizTransport for FakeTransport {
    async fn get_announcements(&self, _quiz_id: i64, lasttime: i64) -> Result<AnnouncementsDelta, ClientError> {
        self.lasttimes.lock().unwrap().push(lasttime);
        self.announcements
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(AnnouncementsDelta { content: String::new(), lasttime }))
    }

    async fn get_student_status(&self, _quiz_id: i64) -> Result<StudentStatusReport, ClientError> {
        *self.status_calls.lock().unwrap() += 1;
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }
}
