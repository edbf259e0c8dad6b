use thiserror::Error;

/// Failures surfaced by the transcription/translation provider.
///
/// These are outside the core's control (network, quota, malformed
/// responses); the provider's diagnostic message is carried opaquely.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("provider returned no text for model {model}")]
    EmptyResponse { model: String },

    #[error("{0}")]
    Other(String),
}
