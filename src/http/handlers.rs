use super::state::AppState;
use crate::error::UplinkError;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StartUploadResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub ok: bool,
    pub received_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct FinishResponse {
    pub ok: bool,
    pub already_started: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

fn error_response(err: &UplinkError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        UplinkError::NotFound { .. } => StatusCode::NOT_FOUND,
        UplinkError::InvalidState { .. } | UplinkError::DuplicateId { .. } => {
            StatusCode::CONFLICT
        }
        UplinkError::EmptyChunk { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            kind: err.kind(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /upload/start
/// Allocate a new upload session
pub async fn start_upload(State(state): State<AppState>) -> impl IntoResponse {
    match state.registry.create().await {
        Ok(id) => {
            info!("Upload session started: {}", id);
            (StatusCode::OK, Json(StartUploadResponse { id })).into_response()
        }
        Err(e) => {
            error!("Failed to create session: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /upload/chunk/:session_id
/// Append one raw-byte chunk to a collecting session
pub async fn upload_chunk(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    match state.registry.append(&session_id, &body).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(ChunkResponse {
                ok: true,
                received_bytes: receipt.received_bytes,
                total_bytes: receipt.total_bytes,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// POST /upload/finish/:session_id
/// Signal end of upload and hand the session to the dispatcher.
/// Idempotent: a second finish is a no-op reporting already_started.
pub async fn upload_finish(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.dispatcher.finish(&session_id).await {
        Ok(begin) => {
            let already_started = begin.already_started();
            let message = if already_started {
                "already processed".to_string()
            } else {
                "processing started".to_string()
            };
            (
                StatusCode::OK,
                Json(FinishResponse {
                    ok: true,
                    already_started,
                    message,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Finish failed for {}: {}", session_id, e);
            error_response(&e).into_response()
        }
    }
}

/// GET /upload/:session_id/status
/// Point-in-time session snapshot
pub async fn upload_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get(&session_id).await {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => error_response(&UplinkError::NotFound { id: session_id }).into_response(),
    }
}

/// GET /uploads
/// Snapshots of every known session
pub async fn list_uploads(State(state): State<AppState>) -> impl IntoResponse {
    let uploads = state.registry.all().await;
    (StatusCode::OK, Json(json!({ "uploads": uploads })))
}

/// GET /last-recording
/// Most recently completed outcome, if any
pub async fn last_recording(State(state): State<AppState>) -> impl IntoResponse {
    match state.latest.get().await {
        Some(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        None => (
            StatusCode::OK,
            Json(json!({ "message": "No recordings yet" })),
        )
            .into_response(),
    }
}

/// GET /
/// Service banner
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "service": state.service_name,
            "message": "Audio uplink server running",
        })),
    )
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
