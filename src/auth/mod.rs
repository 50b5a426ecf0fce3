use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use cookie::{Cookie, SameSite};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    config::AuthConfig,
    domain::{QuizRole, User},
    error::{AppError, Result},
    repository::{QuizRepository, UserRepository},
    service::Clock,
};

pub mod policy;
pub mod session;

use policy::{permits, role_in, Action};
use session::SessionStore;

pub const SESSION_COOKIE: &str = "session";

/// The signed-in user on a quiz route, with their role in that quiz.
#[derive(Debug, Clone)]
pub struct QuizCaller {
    pub user: User,
    pub quiz_id: i64,
    pub role: QuizRole,
}

impl QuizCaller {
    pub fn can(&self, action: Action) -> bool {
        permits(self.role, action)
    }

    /// What the quiz pages should offer this caller.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            poll: self.can(Action::FetchAnnouncements) && !self.role.is_preview(),
            make: self.can(Action::MakeAnnouncement),
            delete: self.can(Action::DeleteAnnouncement),
            manage: self.can(Action::ManageAnnouncements),
            monitor: self.can(Action::ViewStatus),
            configure: self.can(Action::ConfigureQuiz),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Capabilities {
    pub poll: bool,
    pub make: bool,
    pub delete: bool,
    pub manage: bool,
    pub monitor: bool,
    pub configure: bool,
}

pub struct AuthService {
    sessions: SessionStore,
    users: Arc<dyn UserRepository>,
    quizzes: Arc<dyn QuizRepository>,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(
        pool: SqlitePool,
        users: Arc<dyn UserRepository>,
        quizzes: Arc<dyn QuizRepository>,
        clock: Arc<dyn Clock>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            sessions: SessionStore::new(pool, clock, config.session_duration_hours * 3600),
            users,
            quizzes,
            secure_cookies: config.secure_cookies,
        }
    }

    /// Checks the password and opens a session, returning its token.
    /// Unknown users and wrong passwords are indistinguishable.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String)> {
        let (user, hash) = self.users
            .find_credentials(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &hash)? {
            tracing::warn!(%username, "Failed login");
            return Err(AppError::Unauthorized);
        }

        let token = self.sessions.open(user.id).await?;
        tracing::info!(user_id = user.id, "Session opened");

        Ok((user, token))
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        if self.sessions.close(token).await? {
            tracing::debug!("Session closed");
        }
        Ok(())
    }

    /// Resolves a session token into the caller's identity within a quiz.
    pub async fn quiz_caller(&self, token: &str, quiz_id: i64) -> Result<QuizCaller> {
        let user_id = self.sessions
            .user_for(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let role = role_in(self.quizzes.as_ref(), quiz_id, user.id).await?;

        Ok(QuizCaller { user, quiz_id, role })
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.sessions.purge_expired().await
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.secure_cookies)
            .max_age(cookie::time::Duration::seconds(self.sessions.ttl_secs()))
            .build()
    }

    pub fn logout_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
