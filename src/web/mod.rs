pub mod strings;
pub mod templates;
pub mod uploads;

use axum::Router;
use tower_http::services::ServeDir;

use crate::api::state::AppState;

pub const ATTACHMENTS_PATH: &str = "/attachments";

pub fn create_web_routes(state: AppState) -> Router {
    let attachments = ServeDir::new(state.service_context.attachments.root());

    Router::new()
        .nest_service(ATTACHMENTS_PATH, attachments)
        .with_state(state)
}
