//! Error types for the upload core.

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Everything that can go wrong between a device opening a session and a
/// client polling the outcome.
///
/// `NotFound`, `InvalidState`, `EmptyChunk` and `DuplicateId` surface
/// synchronously to the HTTP caller. `AudioTooShort` and `Pipeline` only
/// occur inside a background job, where the dispatcher captures them into a
/// failing [`Outcome`](crate::session::Outcome) instead of letting them
/// cross the request boundary. `Store` is logged and discarded.
#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("session not found: {id}")]
    NotFound { id: String },

    #[error("session {id} is {status}, operation requires {expected}")]
    InvalidState {
        id: String,
        status: &'static str,
        expected: &'static str,
    },

    #[error("empty chunk rejected for session {id}")]
    EmptyChunk { id: String },

    #[error("session id collision: {id} is already live")]
    DuplicateId { id: String },

    #[error("audio too short: {actual_secs:.2}s received, {required_secs:.2}s required")]
    AudioTooShort {
        actual_secs: f64,
        required_secs: f64,
    },

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("history store error: {message}")]
    Store { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),
}

impl UplinkError {
    /// Stable machine-readable kind, carried in error payloads and in
    /// failing outcomes so clients can branch without parsing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::EmptyChunk { .. } => "empty_chunk",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::AudioTooShort { .. } => "audio_too_short",
            Self::Pipeline(_) => "pipeline",
            Self::Store { .. } => "store",
            Self::Internal { .. } => "internal",
            Self::Io(_) => "io",
            Self::Wav(_) => "wav",
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, UplinkError>;
