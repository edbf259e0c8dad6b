use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub pipeline: PipelineConfig,
    pub dispatcher: DispatcherConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Byte sink directory, one `{id}.raw` per session.
    pub raw_dir: String,
    /// Assembled WAV artifacts, served under `/download`.
    pub wav_dir: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_width_bytes: u16,
    pub min_duration_secs: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Audio-capable model for speech-to-text.
    pub stt_model: String,
    /// Text model for translation.
    pub text_model: String,
    pub target_language: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherConfig {
    pub max_concurrent_jobs: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
