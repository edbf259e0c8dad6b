use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState, wav_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        // Health check
        .route("/health", get(handlers::health_check))
        // Upload lifecycle
        .route("/upload/start", post(handlers::start_upload))
        .route("/upload/chunk/:session_id", post(handlers::upload_chunk))
        .route("/upload/finish/:session_id", post(handlers::upload_finish))
        // Status and results
        .route("/upload/:session_id/status", get(handlers::upload_status))
        .route("/uploads", get(handlers::list_uploads))
        .route("/last-recording", get(handlers::last_recording))
        // Assembled WAV artifacts
        .nest_service("/download", ServeDir::new(wav_dir.as_ref()))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
