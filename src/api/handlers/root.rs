use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Quizcast API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Timed announcements for running quizzes",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/auth/login",
            "quizzes": "/api/quizzes/:quiz_id",
            "attachments": "/attachments"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
