use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
    Json,
};

use crate::{
    api::state::AppState,
    auth::QuizCaller,
    domain::{QuizSettings, SaveQuizSettingsRequest},
    error::{AppError, Result},
    web::strings,
};

pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
) -> Result<Json<QuizSettings>> {
    let settings = state.service_context.quiz_settings_service
        .get(caller.quiz_id, caller.user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(strings::NOT_CONFIGURED.to_string()))?;

    Ok(Json(settings))
}

/// Saves the settings. Answers 204 when nothing needed storing.
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
    Json(request): Json<SaveQuizSettingsRequest>,
) -> Result<Response> {
    let saved = state.service_context.quiz_settings_service
        .save(caller.quiz_id, caller.user.id, request)
        .await?;

    Ok(match saved {
        Some(settings) => Json(settings).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
) -> Result<StatusCode> {
    state.service_context.quiz_settings_service
        .delete(caller.quiz_id, caller.user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
