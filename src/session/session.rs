use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::error::UplinkError;

/// Lifecycle of an upload session.
///
/// Transitions are forward-only: `Collecting -> Processing -> Done`. Chunk
/// appends are only accepted while `Collecting`; the registry enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Collecting,
    Processing,
    Done,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Processing => "processing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of processing a session's audio.
///
/// Exactly one of the two shapes, so consumers branch exhaustively instead
/// of probing for optional fields. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        transcript: String,
        translation: String,
        /// Filename of the assembled WAV artifact, servable via `/download`.
        audio_ref: String,
        duration_secs: f64,
    },
    Failure {
        /// Stable machine-readable kind (see [`UplinkError::kind`]).
        kind: String,
        message: String,
    },
}

impl Outcome {
    pub fn ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Capture any processing error as a failing outcome.
    pub fn from_error(err: &UplinkError) -> Self {
        Self::Failure {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

// Wire shape is a flat object discriminated by an `ok` boolean:
// `{"ok": true, "transcript": ..., "translation": ..., "audio_ref": ...,
// "duration_secs": ...}` on success, `{"ok": false, "error_kind": ...,
// "message": ...}` on failure.
impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success {
                transcript,
                translation,
                audio_ref,
                duration_secs,
            } => {
                let mut s = serializer.serialize_struct("Outcome", 5)?;
                s.serialize_field("ok", &true)?;
                s.serialize_field("transcript", transcript)?;
                s.serialize_field("translation", translation)?;
                s.serialize_field("audio_ref", audio_ref)?;
                s.serialize_field("duration_secs", duration_secs)?;
                s.end()
            }
            Self::Failure { kind, message } => {
                let mut s = serializer.serialize_struct("Outcome", 3)?;
                s.serialize_field("ok", &false)?;
                s.serialize_field("error_kind", kind)?;
                s.serialize_field("message", message)?;
                s.end()
            }
        }
    }
}

/// Point-in-time copy of a session, safe to hand to HTTP handlers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub status: SessionStatus,
    pub byte_count: u64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&SessionStatus::Collecting).unwrap();
        assert_eq!(json, "\"collecting\"");
    }

    #[test]
    fn test_success_outcome_wire_shape() {
        let outcome = Outcome::Success {
            transcript: "hello world".to_string(),
            translation: "halo dunia".to_string(),
            audio_ref: "record_upload-1.wav".to_string(),
            duration_secs: 1.5,
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["transcript"], "hello world");
        assert_eq!(value["translation"], "halo dunia");
        assert_eq!(value["audio_ref"], "record_upload-1.wav");
        assert_eq!(value["duration_secs"], 1.5);
    }

    #[test]
    fn test_failure_outcome_wire_shape() {
        let outcome = Outcome::Failure {
            kind: "audio_too_short".to_string(),
            message: "audio too short: 0.50s received, 1.00s required".to_string(),
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error_kind"], "audio_too_short");
        assert!(value["message"].as_str().unwrap().contains("0.50s"));
        assert!(value.get("transcript").is_none());
    }

    #[test]
    fn test_from_error_carries_kind() {
        let err = UplinkError::AudioTooShort {
            actual_secs: 0.5,
            required_secs: 1.0,
        };
        let outcome = Outcome::from_error(&err);

        assert!(!outcome.ok());
        match outcome {
            Outcome::Failure { kind, message } => {
                assert_eq!(kind, "audio_too_short");
                assert!(message.contains("audio too short"));
            }
            Outcome::Success { .. } => panic!("expected failure"),
        }
    }
}
