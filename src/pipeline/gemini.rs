use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{PipelineError, Transcriber, Translator};
use crate::config::PipelineConfig;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const TRANSCRIBE_PROMPT: &str =
    "Transcribe this audio into English only. Output only the transcription text.";

/// Transcription and translation over the Generative Language REST API.
///
/// One adapter implements both collaborator traits: the audio-capable model
/// handles speech-to-text, the text model handles translation. Requests are
/// bounded by a client-level timeout so a hung provider call cannot pin a
/// background job forever.
pub struct GeminiPipeline {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    stt_model: String,
    text_model: String,
}

impl GeminiPipeline {
    pub fn new(config: &PipelineConfig, api_key: String) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            stt_model: config.stt_model.clone(),
            text_model: config.text_model.clone(),
        })
    }

    /// Point the adapter at a different endpoint (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn generate(&self, model: &str, body: Value) -> Result<String, PipelineError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!("Pipeline request to model {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        extract_text(parsed).ok_or_else(|| PipelineError::EmptyResponse {
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Transcriber for GeminiPipeline {
    async fn transcribe(&self, wav: &[u8]) -> Result<String, PipelineError> {
        let body = transcription_request(wav);
        let text = self.generate(&self.stt_model, body).await?;
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl Translator for GeminiPipeline {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, PipelineError> {
        let body = translation_request(text, target_language);
        let translated = self.generate(&self.text_model, body).await?;
        Ok(translated.trim().to_string())
    }
}

fn transcription_request(wav: &[u8]) -> Value {
    let b64_audio = general_purpose::STANDARD.encode(wav);
    json!({
        "contents": [{
            "parts": [
                { "text": TRANSCRIBE_PROMPT },
                {
                    "inline_data": {
                        "mime_type": "audio/wav",
                        "data": b64_audio
                    }
                }
            ]
        }]
    })
}

fn translation_request(text: &str, target_language: &str) -> Value {
    let prompt = format!(
        "Translate the following English text to {}. Output only the translation.\n\n{}",
        target_language, text
    );
    json!({
        "contents": [{
            "parts": [{ "text": prompt }]
        }]
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// First candidate, first part with text. Empty or whitespace-only
/// responses yield `None`.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let text = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| part.text)?;

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
