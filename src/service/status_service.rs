use std::{collections::HashMap, sync::Arc};

use crate::{
    auth::policy::{authorize, Action},
    config::AnnouncementConfig,
    domain::{
        classify, AuditEvent, LastAnnouncement, LastFetch, MonitorPage, MonitorRow, StatusInput,
        StudentStatus, StudentStatusReport,
    },
    error::{AppError, Result},
    repository::{AnnouncementRepository, FetchStatusRepository, QuizRepository},
    web::{strings, templates::display_time},
};
use super::{audit::AuditLog, clock::Clock};

pub struct StatusService {
    announcements: Arc<dyn AnnouncementRepository>,
    fetch_status: Arc<dyn FetchStatusRepository>,
    quizzes: Arc<dyn QuizRepository>,
    audit: Arc<AuditLog>,
    clock: Arc<dyn Clock>,
    config: AnnouncementConfig,
}

impl StatusService {
    pub fn new(
        announcements: Arc<dyn AnnouncementRepository>,
        fetch_status: Arc<dyn FetchStatusRepository>,
        quizzes: Arc<dyn QuizRepository>,
        audit: Arc<AuditLog>,
        clock: Arc<dyn Clock>,
        config: AnnouncementConfig,
    ) -> Self {
        Self {
            announcements,
            fetch_status,
            quizzes,
            audit,
            clock,
            config,
        }
    }

    pub async fn last_announcement(&self, quiz_id: i64, now: i64) -> Result<LastAnnouncement> {
        let last = match self.announcements.latest_time_posted(quiz_id).await? {
            Some(time) => LastAnnouncement {
                time: Some(time),
                str: strings::status_last_announcement(&display_time(time, now), now - time),
            },
            None => LastAnnouncement {
                time: None,
                str: strings::STATUS_NO_ANNOUNCEMENTS.to_string(),
            },
        };
        Ok(last)
    }

    /// The newest announcement and every tracked student's last fetch, least
    /// recently fetched first.
    pub async fn get_student_statuses(&self, quiz_id: i64, user_id: i64) -> Result<StudentStatusReport> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::ViewStatus).await?;

        let now = self.clock.now();
        let last = self.last_announcement(quiz_id, now).await?;

        let status = self
            .fetch_status
            .list_for_quiz(quiz_id)
            .await?
            .into_iter()
            .map(|fetch| StudentStatus {
                userid: fetch.user_id,
                time: fetch.time_fetched,
                str: display_time(fetch.time_fetched, now),
                ago: now - fetch.time_fetched,
            })
            .collect();

        Ok(StudentStatusReport { last, status })
    }

    /// Initial monitor table: one row per enrolled student, in roster order.
    /// Opening it is what gets audited as a status view.
    pub async fn monitor_page(&self, quiz_id: i64, user_id: i64) -> Result<MonitorPage> {
        authorize(self.quizzes.as_ref(), quiz_id, user_id, Action::ViewStatus).await?;

        let settings = self
            .quizzes
            .find_settings(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(strings::NOT_CONFIGURED.to_string()))?;

        let now = self.clock.now();
        let last = self.last_announcement(quiz_id, now).await?;

        let fetched: HashMap<i64, i64> = self
            .fetch_status
            .list_for_quiz(quiz_id)
            .await?
            .into_iter()
            .map(|f| (f.user_id, f.time_fetched))
            .collect();

        let rows = self
            .quizzes
            .list_students(quiz_id)
            .await?
            .into_iter()
            .map(|student| {
                let fetch = fetched.get(&student.id).map(|&time| LastFetch { time, ago: now - time });
                let classification = classify(&StatusInput {
                    fetch,
                    poll_interval: settings.check_interval,
                    last_announcement: last.time,
                });

                let (time, ago) = match fetch {
                    Some(f) => (display_time(f.time, now), f.ago.to_string()),
                    None => (strings::NO_DATA.to_string(), strings::NO_DATA.to_string()),
                };

                MonitorRow {
                    userid: student.id,
                    full_name: student.full_name,
                    username: student.username,
                    time,
                    ago,
                    classification,
                }
            })
            .collect();

        // Once per page view; the refresh polls are not audited.
        self.audit
            .record(quiz_id, Some(user_id), AuditEvent::StudentStatusViewed, None)
            .await?;

        Ok(MonitorPage {
            quiz_id,
            check_interval: settings.check_interval,
            refresh_interval: self.config.monitor_refresh_interval(settings.check_interval),
            last,
            rows,
        })
    }
}
