use axum::{
    extract::State,
    http::StatusCode,
    Extension,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::state::AppState,
    auth::{AuthService, Capabilities, QuizCaller, SESSION_COOKIE},
    domain::QuizRole,
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct CallerResponse {
    pub user_id: i64,
    pub full_name: String,
    pub quiz_id: i64,
    pub role: QuizRole,
    pub can: Capabilities,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let auth = &state.service_context.auth_service;
    let (user, token) = auth.login(&req.username, &req.password).await?;

    Ok((
        jar.add(auth.session_cookie(token)),
        Json(LoginResponse {
            user_id: user.id,
            full_name: user.full_name,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(token) = jar.get(SESSION_COOKIE) {
        state.service_context.auth_service.logout(token.value()).await?;
    }

    Ok((jar.add(AuthService::logout_cookie()), StatusCode::NO_CONTENT))
}

/// Who the caller is in this quiz and which quiz pages they get.
pub async fn me(Extension(caller): Extension<QuizCaller>) -> Json<CallerResponse> {
    let can = caller.capabilities();

    Json(CallerResponse {
        user_id: caller.user.id,
        full_name: caller.user.full_name,
        quiz_id: caller.quiz_id,
        role: caller.role,
        can,
    })
}
