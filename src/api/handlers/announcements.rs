use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::state::AppState,
    auth::QuizCaller,
    domain::{AnnouncementsDelta, PostAnnouncementRequest, RenderedAnnouncement},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct PollQuery {
    pub lasttime: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteAllResponse {
    pub deleted: usize,
}

/// `get_announcements`: HTML of announcements posted since `lasttime`.
pub async fn poll(
    State(state): State<AppState>,
    Query(query): Query<PollQuery>,
    Extension(caller): Extension<QuizCaller>,
) -> Result<Json<AnnouncementsDelta>> {
    let delta = state.service_context.announcement_service
        .fetch_new_announcements(caller.quiz_id, caller.user.id, query.lasttime)
        .await?;

    Ok(Json(delta))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
) -> Result<Json<Vec<RenderedAnnouncement>>> {
    let announcements = state.service_context.announcement_service
        .list_announcements(caller.quiz_id, caller.user.id)
        .await?;

    Ok(Json(announcements))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
    Json(request): Json<PostAnnouncementRequest>,
) -> Result<(StatusCode, Json<RenderedAnnouncement>)> {
    let announcement = state.service_context.announcement_service
        .post_announcement(caller.quiz_id, caller.user.id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(announcement)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((_, id)): Path<(i64, i64)>,
    Extension(caller): Extension<QuizCaller>,
) -> Result<StatusCode> {
    state.service_context.announcement_service
        .delete_announcement(caller.quiz_id, caller.user.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_all(
    State(state): State<AppState>,
    Extension(caller): Extension<QuizCaller>,
) -> Result<Json<DeleteAllResponse>> {
    let deleted = state.service_context.announcement_service
        .delete_all_announcements(caller.quiz_id, caller.user.id)
        .await?;

    Ok(Json(DeleteAllResponse { deleted }))
}
