use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{PipelineError, Transcriber, Translator};

/// Mock collaborator for tests.
///
/// Counts every call so tests can assert the exactly-once dispatch
/// property, and tracks peak in-flight transcriptions for concurrency
/// bounds. An optional artificial delay keeps calls overlapping long
/// enough for those assertions to observe anything.
pub struct MockPipeline {
    transcript: String,
    translation: String,
    transcribe_failure: Option<String>,
    translate_failure: Option<String>,
    delay: Option<Duration>,
    transcribe_calls: AtomicUsize,
    translate_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockPipeline {
    fn default() -> Self {
        Self {
            transcript: "mock transcript".to_string(),
            translation: "mock translation".to_string(),
            transcribe_failure: None,
            translate_failure: None,
            delay: None,
            transcribe_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl MockPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcript(mut self, transcript: &str) -> Self {
        self.transcript = transcript.to_string();
        self
    }

    pub fn with_translation(mut self, translation: &str) -> Self {
        self.translation = translation.to_string();
        self
    }

    pub fn with_transcribe_failure(mut self, message: &str) -> Self {
        self.transcribe_failure = Some(message.to_string());
        self
    }

    pub fn with_translate_failure(mut self, message: &str) -> Self {
        self.translate_failure = Some(message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn transcribe_calls(&self) -> usize {
        self.transcribe_calls.load(Ordering::SeqCst)
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    /// Peak number of concurrently running `transcribe` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for MockPipeline {
    async fn transcribe(&self, _wav: &[u8]) -> Result<String, PipelineError> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.transcribe_failure {
            Some(message) => Err(PipelineError::Other(message.clone())),
            None => Ok(self.transcript.clone()),
        }
    }
}

#[async_trait]
impl Translator for MockPipeline {
    async fn translate(
        &self,
        _text: &str,
        _target_language: &str,
    ) -> Result<String, PipelineError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);

        match &self.translate_failure {
            Some(message) => Err(PipelineError::Other(message.clone())),
            None => Ok(self.translation.clone()),
        }
    }
}
