//! Optional persistent history of completed sessions.
//!
//! Recording history is a fire-and-forget side effect: a store failure is
//! logged by the dispatcher and never changes the session outcome.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::{Result, UplinkError};
use crate::session::Outcome;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub record_id: String,
    pub session_id: String,
    pub recorded_at: DateTime<Utc>,
    pub outcome: Outcome,
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist one completed session, returning the record id.
    async fn record(&self, session_id: &str, outcome: &Outcome) -> Result<String>;
}

/// Append-only JSONL file, one record per completed session.
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl HistoryStore for JsonlHistory {
    async fn record(&self, session_id: &str, outcome: &Outcome) -> Result<String> {
        let entry = HistoryEntry {
            record_id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            recorded_at: Utc::now(),
            outcome: outcome.clone(),
        };

        let mut line = serde_json::to_string(&entry).map_err(|e| UplinkError::Store {
            message: format!("failed to encode history entry: {}", e),
        })?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| UplinkError::Store {
                message: format!("failed to open {}: {}", self.path.display(), e),
            })?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| UplinkError::Store {
                message: format!("failed to write {}: {}", self.path.display(), e),
            })?;

        Ok(entry.record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_jsonl_history_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let history = JsonlHistory::new(&path);

        let outcome = Outcome::Success {
            transcript: "hello".to_string(),
            translation: "halo".to_string(),
            audio_ref: "record_upload-1.wav".to_string(),
            duration_secs: 1.5,
        };

        history.record("upload-1", &outcome).await.unwrap();
        history.record("upload-2", &outcome).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["session_id"], "upload-1");
        assert_eq!(first["outcome"]["ok"], true);
        assert!(first["record_id"].as_str().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_jsonl_history_unwritable_path_is_store_error() {
        let history = JsonlHistory::new("/nonexistent-dir/history.jsonl");
        let outcome = Outcome::Failure {
            kind: "pipeline".to_string(),
            message: "boom".to_string(),
        };

        let err = history.record("upload-1", &outcome).await.unwrap_err();
        assert_eq!(err.kind(), "store");
    }
}
