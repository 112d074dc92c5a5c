pub mod download;
pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::export::handlers as export;
use crate::notify::handlers as notify;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Résumé API
        .route("/api/v1/resume/validate", post(resume::handle_validate))
        .route("/api/v1/resume/export/:format", post(resume::handle_export))
        // Export views
        .route("/api/v1/sessions", post(export::handle_open_session))
        .route(
            "/api/v1/sessions/:id",
            get(export::handle_get_session).delete(export::handle_close_session),
        )
        .route(
            "/api/v1/sessions/:id/template",
            put(export::handle_select_template),
        )
        .route(
            "/api/v1/sessions/:id/preview",
            get(export::handle_get_preview),
        )
        .route(
            "/api/v1/sessions/:id/preview/retry",
            post(export::handle_retry_preview),
        )
        .route(
            "/api/v1/sessions/:id/exports/:channel",
            post(export::handle_request_export),
        )
        // Registration side channel
        .route("/api/v1/registrations", post(notify::handle_register))
        .with_state(state)
}
