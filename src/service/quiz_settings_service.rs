use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::policy::{authorize, Action},
    config::AnnouncementConfig,
    domain::{QuizSettings, SaveQuizSettingsRequest},
    error::{AppError, Result},
    repository::{AnnouncementRepository, QuizRepository},
    web::{strings, uploads::AttachmentStore},
};

pub struct QuizSettingsService {
    quizzes: Arc<dyn QuizRepository>,
    announcements: Arc<dyn AnnouncementRepository>,
    attachments: AttachmentStore,
    config: AnnouncementConfig,
}

impl QuizSettingsService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        announcements: Arc<dyn AnnouncementRepository>,
        attachments: AttachmentStore,
        config: AnnouncementConfig,
    ) -> Self {
        Self {
            quizzes,
            announcements,
            attachments,
            config,
        }
    }

    pub async fn get(&self, quiz_id: i64, user_id: i64) -> Result<Option<QuizSettings>> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::ConfigureQuiz).await?;
        self.quizzes.find_settings(quiz_id).await
    }

    /// Validates and stores the quiz's announcement settings.
    ///
    /// Returns `None` when the quiz has no settings and announcements stay
    /// off, in which case nothing is written.
    pub async fn save(
        &self,
        quiz_id: i64,
        user_id: i64,
        request: SaveQuizSettingsRequest,
    ) -> Result<Option<QuizSettings>> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::ConfigureQuiz).await?;
        request.validate()?;

        let existing = self.quizzes.find_settings(quiz_id).await?;
        if existing.is_none() && !request.use_announcements {
            return Ok(None);
        }

        let check_interval = if self.config.check_interval_locked {
            self.config.default_check_interval
        } else {
            let requested = request
                .check_interval
                .or(existing.as_ref().map(|s| s.check_interval))
                .unwrap_or(self.config.default_check_interval);
            // Switching announcements off is always allowed.
            if request.use_announcements {
                self.validate_check_interval(requested)?;
            }
            requested
        };

        let header = match request.header {
            Some(header) if !header.trim().is_empty() => header,
            _ => self.config.default_header.clone(),
        };

        let saved = self
            .quizzes
            .save_settings(&QuizSettings {
                quiz_id,
                use_announcements: request.use_announcements,
                check_interval,
                header,
            })
            .await?;

        tracing::info!(quiz_id, user_id, use_announcements = saved.use_announcements, check_interval, "Quiz announcement settings saved");

        Ok(Some(saved))
    }

    fn validate_check_interval(&self, interval: i64) -> Result<()> {
        let min = self.config.min_check_interval;
        let max = self.config.max_check_interval;

        if interval < min {
            return Err(AppError::Validation(strings::check_interval_too_small(min)));
        }
        // A maximum not above the minimum is treated as unset.
        if max > min && interval > max {
            return Err(AppError::Validation(strings::check_interval_too_big(max)));
        }
        Ok(())
    }

    /// Removes the settings together with every announcement, attachment and
    /// fetch status of the quiz.
    pub async fn delete(&self, quiz_id: i64, user_id: i64) -> Result<()> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::ConfigureQuiz).await?;

        if self.quizzes.find_settings(quiz_id).await?.is_none() {
            return Err(AppError::NotFound(strings::NOT_CONFIGURED.to_string()));
        }

        let announcements = self.announcements.count_for_quiz(quiz_id).await?;
        self.quizzes.delete_settings(quiz_id).await?;
        self.attachments.delete_for_quiz(quiz_id).await?;

        tracing::info!(quiz_id, user_id, announcements, "Quiz announcement settings deleted");

        Ok(())
    }
}
