use anyhow::{Context, Result};
use hound::WavReader;
use std::io::Cursor;
use std::path::Path;

/// A decoded WAV container, for inspecting assembled artifacts.
pub struct AudioFile {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let reader = WavReader::open(path.as_ref()).context("Failed to open WAV file")?;
        Self::from_reader(reader)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = WavReader::new(Cursor::new(bytes)).context("Failed to parse WAV bytes")?;
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        Ok(Self {
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }
}
