mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{setup, START};
use quizcast::{
    domain::{AttachmentUpload, PostAnnouncementRequest, QuizRole, QuizSettings},
    error::AppError,
    repository::{AnnouncementRepository, FetchStatusRepository, QuizRepository},
};

fn post(content: &str) -> PostAnnouncementRequest {
    PostAnnouncementRequest {
        content: content.to_string(),
        attachments: Vec::new(),
    }
}

#[tokio::test]
async fn test_reload_within_window_keeps_announcement_visible() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    // Posted at t=1000.
    announcements.post_announcement(app.quiz_id, app.editor, post("Exam ends early")).await?;

    // First fetch at t=1005 from the beginning of time.
    app.clock.set(1005);
    let delta = announcements.fetch_new_announcements(app.quiz_id, app.alice, 0).await?;
    assert!(delta.content.contains("Exam ends early"));
    assert_eq!(delta.lasttime, 1005);

    let status = app.services.fetch_status_repo.find(app.quiz_id, app.alice).await?.unwrap();
    assert_eq!((status.time_fetched, status.previous_fetch), (1005, 1005));

    // Reload two seconds later: the announcement is still on the page.
    app.clock.set(1007);
    let page = announcements.open_attempt_page(app.quiz_id, app.alice, false).await?;
    assert!(page.header_html.contains("Exam ends early"));
    assert_eq!(page.poll_interval, Some(30));
    assert_eq!(page.now, 1007);

    let status = app.services.fetch_status_repo.find(app.quiz_id, app.alice).await?.unwrap();
    assert_eq!(status.previous_fetch, 1005);
    assert_eq!(status.time_fetched, 1007);

    // Later incremental poll from the first fetch has nothing new.
    app.clock.set(1040);
    let delta = announcements.fetch_new_announcements(app.quiz_id, app.alice, 1005).await?;
    assert_eq!(delta.content, "");
    assert_eq!(delta.lasttime, 1040);

    Ok(())
}

#[tokio::test]
async fn test_fetch_returns_announcements_since_in_order() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    for (offset, text) in [(0, "first"), (10, "second"), (20, "third")] {
        app.clock.set(START + offset);
        announcements.post_announcement(app.quiz_id, app.editor, post(text)).await?;
    }

    app.clock.set(START + 30);
    let delta = announcements.fetch_new_announcements(app.quiz_id, app.alice, START + 10).await?;

    assert!(!delta.content.contains("first"));
    let second = delta.content.find("second").expect("second announcement");
    let third = delta.content.find("third").expect("third announcement");
    assert!(second < third);

    Ok(())
}

#[tokio::test]
async fn test_retried_fetch_never_returns_fewer() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    announcements.post_announcement(app.quiz_id, app.editor, post("one")).await?;
    app.clock.advance(5);
    let first = announcements.fetch_new_announcements(app.quiz_id, app.alice, START).await?;

    app.clock.advance(5);
    announcements.post_announcement(app.quiz_id, app.editor, post("two")).await?;
    app.clock.advance(5);
    let retry = announcements.fetch_new_announcements(app.quiz_id, app.alice, START).await?;

    assert!(first.content.contains("one"));
    assert!(retry.content.contains("one"));
    assert!(retry.content.contains("two"));

    Ok(())
}

#[tokio::test]
async fn test_attempt_page_popup_uses_reannounce_boundary() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    // First load creates the record and shows no popup.
    let page = announcements.open_attempt_page(app.quiz_id, app.alice, false).await?;
    assert_eq!(page.new_announcements_html, "");
    assert!(page.header_html.contains("data-noannouncements"));

    app.clock.set(1010);
    announcements.post_announcement(app.quiz_id, app.editor, post("Question 3 typo")).await?;

    // Load well after the window: new since the first load.
    app.clock.set(1020);
    let page = announcements.open_attempt_page(app.quiz_id, app.alice, false).await?;
    assert!(page.new_announcements_html.contains("Question 3 typo"));

    // Rapid reload reuses the same boundary.
    app.clock.set(1022);
    let reload = announcements.open_attempt_page(app.quiz_id, app.alice, false).await?;
    assert_eq!(reload.new_announcements_html, page.new_announcements_html);

    let status = app.services.fetch_status_repo.find(app.quiz_id, app.alice).await?.unwrap();
    assert_eq!(status.previous_fetch, 1000);
    assert_eq!(status.time_fetched, 1022);

    Ok(())
}

#[tokio::test]
async fn test_preview_and_review_pages_are_not_tracked() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    let page = announcements.open_attempt_page(app.quiz_id, app.editor, false).await?;
    assert_eq!(page.poll_interval, Some(30));
    assert!(app.services.fetch_status_repo.find(app.quiz_id, app.editor).await?.is_none());

    announcements.fetch_new_announcements(app.quiz_id, app.teacher, 0).await?;
    assert!(app.services.fetch_status_repo.find(app.quiz_id, app.teacher).await?.is_none());

    let review = announcements.open_attempt_page(app.quiz_id, app.bob, true).await?;
    assert_eq!(review.poll_interval, None);
    assert!(app.services.fetch_status_repo.find(app.quiz_id, app.bob).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_posting_rules() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    let err = announcements.post_announcement(app.quiz_id, app.alice, post("hi")).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = announcements.post_announcement(app.quiz_id, app.teacher, post("   ")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // A quiz the teacher teaches but that has no announcement settings.
    let other = app.services.quiz_repo.create_quiz("Unconfigured").await?;
    app.services.quiz_repo.enrol(other.id, app.teacher, QuizRole::Teacher).await?;
    let err = announcements.post_announcement(other.id, app.teacher, post("hi")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = announcements.post_announcement(9999, app.teacher, post("hi")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let posted = announcements.post_announcement(app.quiz_id, app.teacher, post("<b>hi</b>")).await?;
    assert_eq!(posted.time_posted, START);
    assert!(posted.html.contains("<b>hi</b>"));

    Ok(())
}

#[tokio::test]
async fn test_disabled_quiz_does_not_serve_announcements() -> anyhow::Result<()> {
    let app = setup().await?;
    app.services.quiz_repo.save_settings(&QuizSettings {
        quiz_id: app.quiz_id,
        use_announcements: false,
        check_interval: 30,
        header: String::new(),
    }).await?;

    let err = app.services.announcement_service
        .fetch_new_announcements(app.quiz_id, app.alice, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_delete_checks_owner_quiz() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    let other = app.services.quiz_repo.create_quiz("Final").await?;
    app.services.quiz_repo.save_settings(&QuizSettings {
        quiz_id: other.id,
        use_announcements: true,
        check_interval: 30,
        header: String::new(),
    }).await?;
    app.services.quiz_repo.enrol(other.id, app.editor, QuizRole::EditingTeacher).await?;

    let foreign = announcements.post_announcement(other.id, app.editor, post("other quiz")).await?;

    let err = announcements.delete_announcement(app.quiz_id, app.editor, foreign.id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(app.services.announcement_repo.find_by_id(foreign.id).await?.is_some());

    let err = announcements.delete_announcement(app.quiz_id, app.editor, 4242).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let own = announcements.post_announcement(app.quiz_id, app.editor, post("mine")).await?;
    let err = announcements.delete_announcement(app.quiz_id, app.teacher, own.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    announcements.delete_announcement(app.quiz_id, app.editor, own.id).await?;
    assert!(app.services.announcement_repo.find_by_id(own.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_delete_all() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    let err = announcements.delete_all_announcements(app.quiz_id, app.editor).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    announcements.post_announcement(app.quiz_id, app.editor, post("a")).await?;
    announcements.post_announcement(app.quiz_id, app.editor, post("b")).await?;

    assert_eq!(announcements.delete_all_announcements(app.quiz_id, app.editor).await?, 2);
    assert!(announcements.list_announcements(app.quiz_id, app.editor).await?.is_empty());

    let events: Vec<String> = app.services.audit_log
        .list_for_quiz(app.quiz_id)
        .await?
        .into_iter()
        .map(|e| e.event)
        .collect();
    assert_eq!(events, vec!["announcement_created", "announcement_created", "announcements_deleted"]);

    Ok(())
}

#[tokio::test]
async fn test_attachments_follow_announcement() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    let posted = announcements.post_announcement(app.quiz_id, app.editor, PostAnnouncementRequest {
        content: r#"<img src="@@ATTACHMENTS@@/room.png">"#.to_string(),
        attachments: vec![AttachmentUpload {
            filename: "room.png".to_string(),
            data: STANDARD.encode(b"png bytes"),
        }],
    }).await?;

    assert!(posted.html.contains(&format!("/attachments/{}/{}/room.png", app.quiz_id, posted.id)));
    let stored = app.services.attachments.list(app.quiz_id, posted.id).await?;
    assert_eq!(stored, vec!["room.png".to_string()]);

    announcements.delete_announcement(app.quiz_id, app.editor, posted.id).await?;
    assert!(app.services.attachments.list(app.quiz_id, posted.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_rejected_attachment_discards_announcement() -> anyhow::Result<()> {
    let app = setup().await?;

    let err = app.services.announcement_service.post_announcement(app.quiz_id, app.editor, PostAnnouncementRequest {
        content: "see attached".to_string(),
        attachments: vec![AttachmentUpload {
            filename: "payload.exe".to_string(),
            data: STANDARD.encode(b"MZ"),
        }],
    }).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(app.services.announcement_repo.count_for_quiz(app.quiz_id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_finish_attempt_forgets_status() -> anyhow::Result<()> {
    let app = setup().await?;
    let announcements = &app.services.announcement_service;

    announcements.open_attempt_page(app.quiz_id, app.alice, false).await?;
    assert!(app.services.fetch_status_repo.find(app.quiz_id, app.alice).await?.is_some());

    assert!(announcements.finish_attempt(app.quiz_id, app.alice).await?);
    assert!(app.services.fetch_status_repo.find(app.quiz_id, app.alice).await?.is_none());

    // The next attempt starts fresh.
    app.clock.advance(60);
    announcements.open_attempt_page(app.quiz_id, app.alice, false).await?;
    let status = app.services.fetch_status_repo.find(app.quiz_id, app.alice).await?.unwrap();
    assert_eq!(status.previous_fetch, status.time_fetched);

    Ok(())
}
