//! HTTP API for uploading devices and polling clients
//!
//! This module provides the REST surface over the upload core:
//! - POST /upload/start - Allocate a new upload session
//! - POST /upload/chunk/:id - Append a raw audio chunk
//! - POST /upload/finish/:id - Trigger background processing (idempotent)
//! - GET /upload/:id/status - Query session status
//! - GET /uploads - All session snapshots
//! - GET /last-recording - Most recent outcome
//! - GET /download/* - Assembled WAV artifacts
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
