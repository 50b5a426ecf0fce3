pub mod announcement_service;
pub mod audit;
pub mod clock;
pub mod quiz_settings_service;
pub mod status_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::auth::AuthService;
use crate::config::Settings;
use crate::repository::*;
use crate::web::{templates::AnnouncementRenderer, uploads::AttachmentStore, ATTACHMENTS_PATH};
use announcement_service::AnnouncementService;
use audit::AuditLog;
use quiz_settings_service::QuizSettingsService;
use status_service::StatusService;

pub use clock::{Clock, ManualClock, SystemClock};

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub quiz_repo: Arc<dyn QuizRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub fetch_status_repo: Arc<dyn FetchStatusRepository>,
    pub auth_service: Arc<AuthService>,
    pub audit_log: Arc<AuditLog>,
    pub attachments: AttachmentStore,
    pub announcement_service: Arc<AnnouncementService>,
    pub status_service: Arc<StatusService>,
    pub quiz_settings_service: Arc<QuizSettingsService>,
    pub clock: Arc<dyn Clock>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let quiz_repo: Arc<dyn QuizRepository> = Arc::new(SqliteQuizRepository::new(db_pool.clone()));
        let announcement_repo: Arc<dyn AnnouncementRepository> =
            Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));
        let fetch_status_repo: Arc<dyn FetchStatusRepository> =
            Arc::new(SqliteFetchStatusRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            user_repo.clone(),
            quiz_repo.clone(),
            clock.clone(),
            &settings.auth,
        ));
        let audit_log = Arc::new(AuditLog::new(db_pool.clone(), clock.clone()));
        let attachments = AttachmentStore::new(&settings.uploads.dir);
        let renderer = AnnouncementRenderer::new(ATTACHMENTS_PATH);
        let config = settings.announcements.clone();

        let announcement_service = Arc::new(AnnouncementService::new(
            announcement_repo.clone(),
            fetch_status_repo.clone(),
            quiz_repo.clone(),
            attachments.clone(),
            renderer,
            audit_log.clone(),
            clock.clone(),
            config.clone(),
        ));

        let status_service = Arc::new(StatusService::new(
            announcement_repo.clone(),
            fetch_status_repo.clone(),
            quiz_repo.clone(),
            audit_log.clone(),
            clock.clone(),
            config.clone(),
        ));

        let quiz_settings_service = Arc::new(QuizSettingsService::new(
            quiz_repo.clone(),
            announcement_repo.clone(),
            attachments.clone(),
            config,
        ));

        Self {
            user_repo,
            quiz_repo,
            announcement_repo,
            fetch_status_repo,
            auth_service,
            audit_log,
            attachments,
            announcement_service,
            status_service,
            quiz_settings_service,
            clock,
            db_pool,
        }
    }
}
