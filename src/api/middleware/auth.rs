use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    error::AppError,
};

#[derive(Debug, Deserialize)]
pub struct QuizPath {
    pub quiz_id: i64,
}

/// Resolves the session cookie into a `QuizCaller` for the quiz in the path.
///
/// No or stale session is 401, an unknown quiz 404, and a user with no role in
/// the quiz 403. What the role may do is checked by the services.
pub async fn require_quiz_caller(
    State(state): State<AppState>,
    Path(path): Path<QuizPath>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .ok_or(AppError::Unauthorized)?;

    let caller = state.service_context.auth_service
        .quiz_caller(token.value(), path.quiz_id)
        .await?;

    tracing::debug!(quiz_id = caller.quiz_id, user_id = caller.user.id, role = ?caller.role, "Quiz caller");
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}
