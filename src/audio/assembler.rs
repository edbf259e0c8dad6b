use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::AudioConfig;
use crate::error::{Result, UplinkError};

/// An assembled, self-describing audio container ready for the pipeline.
#[derive(Debug, Clone)]
pub struct AssembledAudio {
    /// Stable locator for the artifact (the WAV filename under `wav_dir`).
    pub audio_ref: String,
    pub path: PathBuf,
    /// The full container bytes, fed to the pipeline directly so the job
    /// does not re-read the file it just wrote.
    pub wav_bytes: Vec<u8>,
    pub duration_secs: f64,
    pub sample_count: usize,
}

/// Wraps raw little-endian PCM samples into a WAV container.
///
/// Encoding is deterministic: same bytes and same config produce the same
/// container bytes. Uploads shorter than the minimum duration are rejected
/// before any pipeline call is made.
pub struct AudioAssembler {
    sample_rate: u32,
    channels: u16,
    sample_width_bytes: u16,
    min_duration_secs: f64,
    wav_dir: PathBuf,
}

impl AudioAssembler {
    pub fn new(config: &AudioConfig) -> Result<Self> {
        let wav_dir = PathBuf::from(&config.wav_dir);
        std::fs::create_dir_all(&wav_dir)?;

        Ok(Self {
            sample_rate: config.sample_rate,
            channels: config.channels,
            sample_width_bytes: config.sample_width_bytes,
            min_duration_secs: config.min_duration_secs,
            wav_dir,
        })
    }

    /// Bytes per second of audio at the configured format.
    fn byte_rate(&self) -> f64 {
        self.sample_rate as f64 * self.sample_width_bytes as f64 * self.channels as f64
    }

    /// Encode raw PCM into WAV container bytes. Pure: no I/O.
    pub fn encode(&self, raw: &[u8]) -> Result<(Vec<u8>, usize)> {
        let actual_secs = raw.len() as f64 / self.byte_rate();
        if actual_secs < self.min_duration_secs {
            return Err(UplinkError::AudioTooShort {
                actual_secs,
                required_secs: self.min_duration_secs,
            });
        }

        let frame_bytes = self.sample_width_bytes as usize;
        let usable = raw.len() - raw.len() % frame_bytes;
        if usable < raw.len() {
            warn!(
                "Dropping {} trailing byte(s) of a partial sample",
                raw.len() - usable
            );
        }

        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.sample_width_bytes * 8,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        let mut sample_count = 0;
        for pair in raw[..usable].chunks_exact(frame_bytes) {
            let sample = i16::from_le_bytes([pair[0], pair[1]]);
            writer.write_sample(sample)?;
            sample_count += 1;
        }
        writer.finalize()?;

        Ok((cursor.into_inner(), sample_count))
    }

    /// Encode the raw bytes and persist the container to
    /// `wav_dir/record_{id}.wav`.
    pub async fn assemble(&self, id: &str, raw: &[u8]) -> Result<AssembledAudio> {
        let (wav_bytes, sample_count) = self.encode(raw)?;

        let audio_ref = format!("record_{}.wav", id);
        let path = self.wav_dir.join(&audio_ref);
        tokio::fs::write(&path, &wav_bytes).await?;

        let duration_secs =
            sample_count as f64 / (self.sample_rate as f64 * self.channels as f64);
        info!(
            "Assembled {}: {:.1}s, {} samples -> {}",
            id,
            duration_secs,
            sample_count,
            path.display()
        );

        Ok(AssembledAudio {
            audio_ref,
            path,
            wav_bytes,
            duration_secs,
            sample_count,
        })
    }
}
