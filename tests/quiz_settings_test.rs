mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{setup, setup_with};
use quizcast::{
    domain::{AttachmentUpload, PostAnnouncementRequest, QuizRole, SaveQuizSettingsRequest},
    error::AppError,
    repository::{AnnouncementRepository, FetchStatusRepository, QuizRepository},
};

fn request(use_announcements: bool, check_interval: Option<i64>, header: Option<&str>) -> SaveQuizSettingsRequest {
    SaveQuizSettingsRequest {
        use_announcements,
        check_interval,
        header: header.map(str::to_string),
    }
}

#[tokio::test]
async fn test_interval_outside_bounds_is_rejected() -> anyhow::Result<()> {
    let app = setup().await?;
    let settings = &app.services.quiz_settings_service;

    let err = settings.save(app.quiz_id, app.editor, request(true, Some(10), None)).await.unwrap_err();
    match err {
        AppError::Validation(msg) => assert_eq!(msg, "Check interval must be at least 30 seconds"),
        other => panic!("unexpected error: {:?}", other),
    }

    let err = settings.save(app.quiz_id, app.editor, request(true, Some(301), None)).await.unwrap_err();
    match err {
        AppError::Validation(msg) => assert_eq!(msg, "Check interval must be at most 300 seconds"),
        other => panic!("unexpected error: {:?}", other),
    }

    // Nothing changed.
    let stored = app.services.quiz_repo.find_settings(app.quiz_id).await?.unwrap();
    assert_eq!(stored.check_interval, 30);

    let saved = settings.save(app.quiz_id, app.editor, request(true, Some(60), Some("<h3>News</h3>"))).await?.unwrap();
    assert_eq!(saved.check_interval, 60);
    assert_eq!(saved.header, "<h3>News</h3>");

    Ok(())
}

#[tokio::test]
async fn test_locked_interval_ignores_request() -> anyhow::Result<()> {
    let app = setup_with(|s| {
        s.announcements.check_interval_locked = true;
        s.announcements.default_check_interval = 45;
    }).await?;

    let saved = app.services.quiz_settings_service
        .save(app.quiz_id, app.editor, request(true, Some(5), None))
        .await?
        .unwrap();
    assert_eq!(saved.check_interval, 45);

    Ok(())
}

#[tokio::test]
async fn test_unused_settings_are_not_created() -> anyhow::Result<()> {
    let app = setup().await?;

    let quiz = app.services.quiz_repo.create_quiz("Practice").await?;
    app.services.quiz_repo.enrol(quiz.id, app.editor, QuizRole::EditingTeacher).await?;

    let saved = app.services.quiz_settings_service
        .save(quiz.id, app.editor, request(false, Some(60), None))
        .await?;
    assert!(saved.is_none());
    assert!(app.services.quiz_repo.find_settings(quiz.id).await?.is_none());

    // Turning announcements on creates them with defaults filled in.
    let saved = app.services.quiz_settings_service
        .save(quiz.id, app.editor, request(true, None, Some("   ")))
        .await?
        .unwrap();
    assert_eq!(saved.check_interval, 30);
    assert_eq!(saved.header, "<h4>Announcements</h4>");

    // Once they exist, switching off keeps the row.
    let saved = app.services.quiz_settings_service
        .save(quiz.id, app.editor, request(false, None, None))
        .await?
        .unwrap();
    assert!(!saved.use_announcements);

    Ok(())
}

#[tokio::test]
async fn test_only_editing_roles_configure() -> anyhow::Result<()> {
    let app = setup().await?;

    let err = app.services.quiz_settings_service
        .save(app.quiz_id, app.teacher, request(true, Some(60), None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = app.services.quiz_settings_service.delete(app.quiz_id, app.alice).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn test_delete_cascades() -> anyhow::Result<()> {
    let app = setup().await?;

    let posted = app.services.announcement_service.post_announcement(app.quiz_id, app.editor, PostAnnouncementRequest {
        content: "map attached".to_string(),
        attachments: vec![AttachmentUpload {
            filename: "map.png".to_string(),
            data: STANDARD.encode(b"png"),
        }],
    }).await?;
    app.services.announcement_service.fetch_new_announcements(app.quiz_id, app.alice, 0).await?;

    app.services.quiz_settings_service.delete(app.quiz_id, app.editor).await?;

    assert!(app.services.quiz_repo.find_settings(app.quiz_id).await?.is_none());
    assert_eq!(app.services.announcement_repo.count_for_quiz(app.quiz_id).await?, 0);
    assert!(app.services.fetch_status_repo.list_for_quiz(app.quiz_id).await?.is_empty());
    assert!(app.services.attachments.list(app.quiz_id, posted.id).await?.is_empty());

    let err = app.services.quiz_settings_service.delete(app.quiz_id, app.editor).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_disabling_skips_interval_bounds() -> anyhow::Result<()> {
    // The fixture quiz stores 30s; the site minimum has since been raised.
    let app = setup_with(|s| s.announcements.min_check_interval = 60).await?;
    let settings = &app.services.quiz_settings_service;

    let saved = settings.save(app.quiz_id, app.editor, request(false, None, None)).await?.unwrap();
    assert!(!saved.use_announcements);
    assert_eq!(saved.check_interval, 30);

    // Turning them back on has to meet the new minimum.
    let err = settings.save(app.quiz_id, app.editor, request(true, None, None)).await.unwrap_err();
    match err {
        AppError::Validation(msg) => assert_eq!(msg, "Check interval must be at least 60 seconds"),
        other => panic!("unexpected error: {:?}", other),
    }

    let saved = settings.save(app.quiz_id, app.editor, request(true, Some(90), None)).await?.unwrap();
    assert!(saved.use_announcements);
    assert_eq!(saved.check_interval, 90);

    Ok(())
}
