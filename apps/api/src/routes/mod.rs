pub mod health;

use axum::{http::Uri, routing::get, Router};

use crate::errors::AppError;
use crate::jobs::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Server-side filtering
        .route("/api/jobs", get(handlers::handle_list_jobs))
        // Full fetch for client-side filtering
        .route("/api/jobs/all", get(handlers::handle_all_jobs))
        .fallback(not_found)
        .with_state(state)
}
