pub mod health;
pub mod templates;

use axum::{
    routing::{get, post},
    Router,
};

use crate::download;
use crate::resumes::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(templates::handle_list_templates))
        // Resume CRUD
        .route(
            "/api/v1/resumes",
            get(handlers::handle_list_resumes).post(handlers::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(handlers::handle_get_resume)
                .put(handlers::handle_update_resume)
                .delete(handlers::handle_delete_resume),
        )
        // PDF export
        .route(
            "/api/v1/resumes/:id/download",
            get(download::handle_download_stored),
        )
        .route("/api/v1/download", post(download::handle_download_inline))
        .with_state(state)
}
