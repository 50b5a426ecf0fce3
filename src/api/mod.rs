pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, delete},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Auth routes
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))

        // API routes
        .nest("/api/quizzes/:quiz_id", quiz_routes(app_state.clone()))

        .with_state(app_state.clone())

        // Attachment files
        .merge(crate::web::create_web_routes(app_state))

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn quiz_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::auth::me))

        // Polling RPCs
        .route("/announcements/poll", get(handlers::announcements::poll))
        .route("/status", get(handlers::status::student_status))
        .route("/monitor", get(handlers::status::monitor))

        // Attempt lifecycle
        .route("/attempt/start", post(handlers::attempts::start))
        .route("/attempt/finish", post(handlers::attempts::finish))

        // Announcement management
        .route(
            "/announcements",
            get(handlers::announcements::list)
                .post(handlers::announcements::create)
                .delete(handlers::announcements::delete_all),
        )
        .route("/announcements/:id", delete(handlers::announcements::delete))

        // Quiz announcement settings
        .route(
            "/settings",
            get(handlers::settings::get)
                .put(handlers::settings::update)
                .delete(handlers::settings::delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_quiz_caller,
        ))
}
