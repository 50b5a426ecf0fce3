//! Who may do what within a quiz.
//!
//! Every service entry point goes through [`authorize`] with the action it
//! performs, so the role table below is the only place capabilities live.

use crate::{
    domain::QuizRole,
    error::{AppError, Result},
    repository::QuizRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Poll for announcements / open the attempt page.
    FetchAnnouncements,
    MakeAnnouncement,
    DeleteAnnouncement,
    /// See the announcement management list (make or delete).
    ManageAnnouncements,
    ViewStatus,
    ConfigureQuiz,
}

pub fn permits(role: QuizRole, action: Action) -> bool {
    use QuizRole::*;

    match action {
        Action::FetchAnnouncements => true,
        Action::MakeAnnouncement => matches!(role, Manager | EditingTeacher | Teacher),
        Action::DeleteAnnouncement => matches!(role, Manager | EditingTeacher),
        Action::ManageAnnouncements => {
            permits(role, Action::MakeAnnouncement) || permits(role, Action::DeleteAnnouncement)
        }
        Action::ViewStatus => matches!(role, Manager | EditingTeacher | Teacher),
        Action::ConfigureQuiz => matches!(role, Manager | EditingTeacher),
    }
}

/// Checks that `user_id` may perform `action` in `quiz_id` and returns their role.
///
/// Unknown quizzes are `NotFound`; users without a role in the quiz, or whose
/// role lacks the capability, are `Forbidden`.
pub async fn authorize(
    quizzes: &dyn QuizRepository,
    quiz_id: i64,
    user_id: i64,
    action: Action,
) -> Result<QuizRole> {
    let role = role_in(quizzes, quiz_id, user_id).await?;

    if !permits(role, action) {
        tracing::warn!(quiz_id, user_id, ?role, ?action, "Capability check failed");
        return Err(AppError::Forbidden);
    }

    Ok(role)
}

/// The user's role in the quiz. Unknown quizzes are `NotFound`; users with no
/// role there are `Forbidden`.
pub async fn role_in(quizzes: &dyn QuizRepository, quiz_id: i64, user_id: i64) -> Result<QuizRole> {
    if quizzes.find_quiz(quiz_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Quiz {} not found", quiz_id)));
    }

    quizzes
        .role_of(quiz_id, user_id)
        .await?
        .ok_or(AppError::Forbidden)
}
