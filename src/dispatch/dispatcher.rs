use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use super::latest::LatestResult;
use crate::audio::AudioAssembler;
use crate::config::DispatcherConfig;
use crate::error::{Result, UplinkError};
use crate::history::HistoryStore;
use crate::pipeline::{Transcriber, Translator};
use crate::session::{Begin, Outcome, SessionRegistry};
use crate::sink::ByteSink;

/// Launches exactly one background processing job per session.
///
/// The finish path is the registry's atomic check-and-set plus a
/// `tokio::spawn`; the caller never waits on processing. Jobs draw permits
/// from a semaphore so the number of in-flight pipeline calls stays
/// bounded, and every failure inside a job, panics included, is converted
/// into a failing [`Outcome`] so the session always reaches `Done`.
#[derive(Clone)]
pub struct JobDispatcher {
    registry: Arc<SessionRegistry>,
    sink: Arc<dyn ByteSink>,
    assembler: Arc<AudioAssembler>,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    history: Option<Arc<dyn HistoryStore>>,
    latest: Arc<LatestResult>,
    jobs: Arc<Semaphore>,
    target_language: String,
}

impl JobDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<SessionRegistry>,
        sink: Arc<dyn ByteSink>,
        assembler: Arc<AudioAssembler>,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        history: Option<Arc<dyn HistoryStore>>,
        latest: Arc<LatestResult>,
        config: &DispatcherConfig,
        target_language: String,
    ) -> Self {
        Self {
            registry,
            sink,
            assembler,
            transcriber,
            translator,
            history,
            latest,
            jobs: Arc::new(Semaphore::new(config.max_concurrent_jobs)),
            target_language,
        }
    }

    /// Handle a finish signal. Returns `Begin::AlreadyStarted` without
    /// spawning anything if processing is already underway or done.
    pub async fn finish(&self, id: &str) -> Result<Begin> {
        match self.registry.begin_processing(id).await? {
            Begin::AlreadyStarted => Ok(Begin::AlreadyStarted),
            Begin::Started => {
                let this = self.clone();
                let id = id.to_string();
                tokio::spawn(async move {
                    this.run_job(&id).await;
                });
                Ok(Begin::Started)
            }
        }
    }

    async fn run_job(&self, id: &str) {
        // Closed only at shutdown; a job racing that is fine to drop.
        let _permit = match Arc::clone(&self.jobs).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        // The fallible stage runs in its own task so a panic surfaces as a
        // JoinError here instead of leaving the session stuck in
        // `Processing`.
        let this = self.clone();
        let session_id = id.to_string();
        let staged =
            tokio::spawn(async move { this.run_stages(&session_id).await }).await;

        let outcome = match staged {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                warn!("Processing failed for {}: {}", id, err);
                Outcome::from_error(&err)
            }
            Err(join_err) => {
                error!("Processing task panicked for {}: {}", id, join_err);
                Outcome::from_error(&UplinkError::Internal {
                    message: format!("processing task panicked: {}", join_err),
                })
            }
        };

        if let Err(err) = self.registry.complete(id, outcome.clone()).await {
            error!("Failed to record outcome for {}: {}", id, err);
        }
        self.latest.set(outcome.clone()).await;

        if let Some(history) = &self.history {
            match history.record(id, &outcome).await {
                Ok(record_id) => info!("History record {} written for {}", record_id, id),
                Err(err) => warn!("History record failed for {}: {}", id, err),
            }
        }
    }

    async fn run_stages(&self, id: &str) -> Result<Outcome> {
        let raw = self.sink.read_all(id).await?;
        let audio = self.assembler.assemble(id, &raw).await?;

        let transcript = self.transcriber.transcribe(&audio.wav_bytes).await?;
        info!("Transcript for {}: {}", id, transcript);

        let translation = self
            .translator
            .translate(&transcript, &self.target_language)
            .await?;
        info!("Translation for {}: {}", id, translation);

        Ok(Outcome::Success {
            transcript,
            translation,
            audio_ref: audio.audio_ref,
            duration_secs: audio.duration_secs,
        })
    }
}
