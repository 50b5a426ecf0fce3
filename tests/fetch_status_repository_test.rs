use std::sync::Arc;

use quizcast::{
    domain::{CreateUserRequest, FetchStatus, FetchUpdate, QuizSettings},
    repository::{
        FetchStatusRepository, QuizRepository, SqliteFetchStatusRepository, SqliteQuizRepository,
        SqliteUserRepository, UserRepository,
    },
};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_fetches_share_one_record() -> anyhow::Result<()> {
    // A file database so each tab gets its own connection.
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("quizcast.db").display());
    let pool = SqlitePoolOptions::new().max_connections(8).connect(&url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let quizzes = SqliteQuizRepository::new(pool.clone());
    let quiz = quizzes.create_quiz("Midterm").await?;
    quizzes.save_settings(&QuizSettings {
        quiz_id: quiz.id,
        use_announcements: true,
        check_interval: 30,
        header: String::new(),
    }).await?;

    let student = SqliteUserRepository::new(pool.clone())
        .create(CreateUserRequest {
            username: "alice".to_string(),
            full_name: "Alice Anders".to_string(),
            password: "password123".to_string(),
        })
        .await?;

    let repo = Arc::new(SqliteFetchStatusRepository::new(pool.clone()));
    let mut tabs = JoinSet::new();
    for _ in 0..6 {
        let repo = repo.clone();
        let (quiz_id, user_id) = (quiz.id, student.id);
        tabs.spawn(async move { repo.record_fetch(quiz_id, user_id, 1005, 5, true).await });
    }

    let mut created = 0;
    while let Some(joined) = tabs.join_next().await {
        match joined?? {
            FetchUpdate::Created(_) => created += 1,
            FetchUpdate::Advanced { boundary, .. } => assert_eq!(boundary, 1005),
            FetchUpdate::Untracked => panic!("student fetch was not tracked"),
        }
    }
    assert_eq!(created, 1);

    let stored = repo.find(quiz.id, student.id).await?;
    assert_eq!(stored, Some(FetchStatus::first(quiz.id, student.id, 1005)));

    Ok(())
}

#[tokio::test]
async fn test_preview_fetch_creates_nothing() -> anyhow::Result<()> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let repo = SqliteFetchStatusRepository::new(pool);
    assert_eq!(repo.record_fetch(1, 1, 1005, 5, false).await?, FetchUpdate::Untracked);
    assert!(repo.find(1, 1).await?.is_none());

    Ok(())
}
