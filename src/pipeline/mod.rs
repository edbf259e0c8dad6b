//! Transcription and translation collaborators.
//!
//! The dispatcher only sees these two traits; the Gemini adapter is the
//! production implementation and `MockPipeline` stands in for tests.

mod error;
mod gemini;
mod mock;

pub use error::PipelineError;
pub use gemini::GeminiPipeline;
pub use mock::MockPipeline;

use async_trait::async_trait;

/// Speech-to-text over an assembled WAV container.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe WAV audio to English text.
    async fn transcribe(&self, wav: &[u8]) -> Result<String, PipelineError>;
}

/// Text translation into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str)
        -> Result<String, PipelineError>;
}
