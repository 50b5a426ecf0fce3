use axum::{
    extract::State,
    http::StatusCode,
    Extension,
    Json,
};
use serde::Deserialize;

use crate::{
    api::state::AppState,
    auth::QuizCaller,
    domain::AttemptPage,
    error::Result,
};

#[derive(Debug, Default, Deserialize)]
pub struct StartAttemptRequest {
    /// Review pages show announcements but do not poll.
    #[serde(default)]
    pub review: bool,
}

pub async fn start(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
    request: Option<Json<StartAttemptRequest>>,
) -> Result<Json<AttemptPage>> {
    let review = request.map(|Json(r)| r.review).unwrap_or(false);

    let page = state.service_context.announcement_service
        .open_attempt_page(caller.quiz_id, caller.user.id, review)
        .await?;

    Ok(Json(page))
}

pub async fn finish(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
) -> Result<StatusCode> {
    state.service_context.announcement_service
        .finish_attempt(caller.quiz_id, caller.user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
