use axum::{
    extract::State,
    Extension,
    Json,
};

use crate::{
    api::state::AppState,
    auth::QuizCaller,
    domain::{MonitorPage, StudentStatusReport},
    error::Result,
};

/// `get_student_status`: newest announcement plus each student's last fetch.
pub async fn student_status(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
) -> Result<Json<StudentStatusReport>> {
    let report = state.service_context.status_service
        .get_student_statuses(caller.quiz_id, caller.user.id)
        .await?;

    Ok(Json(report))
}

pub async fn monitor(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
) -> Result<Json<MonitorPage>> {
    let page = state.service_context.status_service
        .monitor_page(caller.quiz_id, caller.user.id)
        .await?;

    Ok(Json(page))
}
