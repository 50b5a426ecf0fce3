use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::policy::{authorize, Action},
    config::AnnouncementConfig,
    domain::{
        AnnouncementsDelta, AttemptPage, AuditEvent, PostAnnouncementRequest, QuizSettings,
        RenderedAnnouncement,
    },
    error::{AppError, Result},
    repository::{AnnouncementRepository, FetchStatusRepository, QuizRepository},
    web::{strings, templates::AnnouncementRenderer, uploads::AttachmentStore},
};
use super::{audit::AuditLog, clock::Clock};

pub struct AnnouncementService {
    announcements: Arc<dyn AnnouncementRepository>,
    fetch_status: Arc<dyn FetchStatusRepository>,
    quizzes: Arc<dyn QuizRepository>,
    attachments: AttachmentStore,
    renderer: AnnouncementRenderer,
    audit: Arc<AuditLog>,
    clock: Arc<dyn Clock>,
    config: AnnouncementConfig,
}

impl AnnouncementService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        announcements: Arc<dyn AnnouncementRepository>,
        fetch_status: Arc<dyn FetchStatusRepository>,
        quizzes: Arc<dyn QuizRepository>,
        attachments: AttachmentStore,
        renderer: AnnouncementRenderer,
        audit: Arc<AuditLog>,
        clock: Arc<dyn Clock>,
        config: AnnouncementConfig,
    ) -> Self {
        Self {
            announcements,
            fetch_status,
            quizzes,
            attachments,
            renderer,
            audit,
            clock,
            config,
        }
    }

    async fn configured_settings(&self, quiz_id: i64) -> Result<QuizSettings> {
        self.quizzes
            .find_settings(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(strings::NOT_CONFIGURED.to_string()))
    }

    async fn enabled_settings(&self, quiz_id: i64) -> Result<QuizSettings> {
        let settings = self.configured_settings(quiz_id).await?;
        if !settings.use_announcements {
            return Err(AppError::BadRequest(strings::NOT_ENABLED.to_string()));
        }
        Ok(settings)
    }

    /// Announcements posted at or after `last_fetch_time`, plus the server time
    /// the caller must send back on its next poll.
    ///
    /// Retrying with the same `last_fetch_time` returns the same announcements
    /// or more, never fewer.
    pub async fn fetch_new_announcements(
        &self,
        quiz_id: i64,
        user_id: i64,
        last_fetch_time: i64,
    ) -> Result<AnnouncementsDelta> {
        let role = authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::FetchAnnouncements).await?;
        self.enabled_settings(quiz_id).await?;

        let now = self.clock.now();
        let new = self.announcements.list_since(quiz_id, last_fetch_time).await?;
        let content = self.renderer.render_html(&new, now)?;

        self.fetch_status
            .record_fetch(quiz_id, user_id, now, self.config.reannounce_window, !role.is_preview())
            .await?;

        self.audit
            .record(quiz_id, Some(user_id), AuditEvent::AnnouncementsViewed, None)
            .await?;

        tracing::debug!(quiz_id, user_id, last_fetch_time, count = new.len(), "Fetched announcements");

        Ok(AnnouncementsDelta { content, lasttime: now })
    }

    /// Sets up a student's attempt page: the header with every announcement,
    /// the popup of announcements new since the last page load, and the
    /// poller's starting point. Review pages do not poll and touch no state.
    pub async fn open_attempt_page(&self, quiz_id: i64, user_id: i64, review: bool) -> Result<AttemptPage> {
        let role = authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::FetchAnnouncements).await?;
        let settings = self.enabled_settings(quiz_id).await?;

        let now = self.clock.now();
        let all = self.announcements.list_for_quiz(quiz_id).await?;
        let header_html = self
            .renderer
            .render_attempt_header(&settings.header, &self.renderer.render_html(&all, now)?)?;

        if review {
            return Ok(AttemptPage {
                quiz_id,
                header_html,
                new_announcements_html: String::new(),
                poll_interval: None,
                now,
            });
        }

        let update = self
            .fetch_status
            .record_fetch(quiz_id, user_id, now, self.config.reannounce_window, !role.is_preview())
            .await?;

        let new_announcements_html = match update.boundary() {
            Some(boundary) => {
                let new: Vec<_> = all.into_iter().filter(|a| a.time_posted >= boundary).collect();
                self.renderer.render_html(&new, now)?
            }
            None => String::new(),
        };

        Ok(AttemptPage {
            quiz_id,
            header_html,
            new_announcements_html,
            poll_interval: Some(settings.check_interval),
            now,
        })
    }

    pub async fn post_announcement(
        &self,
        quiz_id: i64,
        user_id: i64,
        request: PostAnnouncementRequest,
    ) -> Result<RenderedAnnouncement> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::MakeAnnouncement).await?;
        request.validate()?;

        if request.content.trim().is_empty() {
            return Err(AppError::Validation("Announcement content is required".to_string()));
        }

        self.configured_settings(quiz_id).await?;

        let now = self.clock.now();
        let announcement = self
            .announcements
            .create(quiz_id, &request.content, Some(user_id), now)
            .await?;

        for upload in &request.attachments {
            if let Err(e) = self.attachments.save_upload(quiz_id, announcement.id, upload).await {
                tracing::warn!(quiz_id, announcement_id = announcement.id, "Attachment rejected, rolling back announcement: {}", e);
                self.announcements.delete(announcement.id).await?;
                self.attachments.delete_for_announcement(quiz_id, announcement.id).await?;
                return Err(e);
            }
        }

        self.audit
            .record(quiz_id, Some(user_id), AuditEvent::AnnouncementCreated, Some(announcement.id))
            .await?;

        self.renderer.render(&announcement, now)
    }

    pub async fn list_announcements(&self, quiz_id: i64, user_id: i64) -> Result<Vec<RenderedAnnouncement>> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::ManageAnnouncements).await?;

        let announcements = self.announcements.list_for_quiz(quiz_id).await?;
        self.renderer.render_all(&announcements, self.clock.now())
    }

    pub async fn delete_announcement(&self, quiz_id: i64, user_id: i64, announcement_id: i64) -> Result<()> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::DeleteAnnouncement).await?;

        let announcement = self
            .announcements
            .find_by_id(announcement_id)
            .await?
            .ok_or_else(|| AppError::NotFound(strings::ANNOUNCEMENT_NOT_FOUND.to_string()))?;

        if announcement.quiz_id != quiz_id {
            return Err(AppError::BadRequest(strings::QUIZ_MISMATCH.to_string()));
        }

        self.announcements.delete(announcement_id).await?;
        self.attachments.delete_for_announcement(quiz_id, announcement_id).await?;

        self.audit
            .record(quiz_id, Some(user_id), AuditEvent::AnnouncementDeleted, Some(announcement_id))
            .await?;

        Ok(())
    }

    /// Deletes every announcement of the quiz. Returns how many were removed.
    pub async fn delete_all_announcements(&self, quiz_id: i64, user_id: i64) -> Result<usize> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::DeleteAnnouncement).await?;

        let deleted = self.announcements.delete_all_for_quiz(quiz_id).await?;
        if deleted.is_empty() {
            return Err(AppError::NotFound(strings::NONE_TO_DELETE.to_string()));
        }

        for id in &deleted {
            self.attachments.delete_for_announcement(quiz_id, *id).await?;
        }

        self.audit
            .record(quiz_id, Some(user_id), AuditEvent::AnnouncementsDeleted, None)
            .await?;

        Ok(deleted.len())
    }

    /// Forgets the student's fetch status so the next attempt starts fresh.
    pub async fn finish_attempt(&self, quiz_id: i64, user_id: i64) -> Result<bool> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::FetchAnnouncements).await?;

        let removed = self.fetch_status.delete(quiz_id, user_id).await?;
        tracing::debug!(quiz_id, user_id, removed, "Attempt finished");
        Ok(removed)
    }
}
