use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use super::session::{Outcome, SessionSnapshot, SessionStatus};
use crate::error::{Result, UplinkError};
use crate::sink::ByteSink;

/// Signal returned by [`SessionRegistry::begin_processing`].
///
/// `AlreadyStarted` is not an error: duplicate finish calls are idempotent
/// no-ops by contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Begin {
    Started,
    AlreadyStarted,
}

impl Begin {
    pub fn already_started(&self) -> bool {
        matches!(self, Self::AlreadyStarted)
    }
}

/// Receipt for a successful chunk append.
#[derive(Debug, Clone, Copy)]
pub struct AppendReceipt {
    pub received_bytes: u64,
    pub total_bytes: u64,
}

struct SessionState {
    status: SessionStatus,
    byte_count: u64,
    finished_at: Option<DateTime<Utc>>,
    outcome: Option<Outcome>,
}

struct SessionEntry {
    id: String,
    started_at: DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl SessionEntry {
    async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            id: self.id.clone(),
            status: state.status,
            byte_count: state.byte_count,
            started_at: self.started_at,
            finished_at: state.finished_at,
            outcome: state.outcome.clone(),
        }
    }
}

/// Single source of truth for upload-session lifecycle.
///
/// The outer map lock is held only to look up or insert entries. Each
/// session carries its own mutex, held across byte-sink I/O, so one
/// session's append never blocks another's. The `Collecting -> Processing`
/// check-and-set in [`begin_processing`](Self::begin_processing) happens
/// under that per-session lock and is the one place a race would produce a
/// user-visible bug (duplicate background jobs).
pub struct SessionRegistry {
    sink: Arc<dyn ByteSink>,
    sessions: RwLock<HashMap<String, Arc<SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new(sink: Arc<dyn ByteSink>) -> Self {
        Self {
            sink,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Allocate a new session in `Collecting` state and return its id.
    pub async fn create(&self) -> Result<String> {
        let id = format!("upload-{}", uuid::Uuid::new_v4());
        self.create_with_id(id.clone()).await?;
        Ok(id)
    }

    /// Insert a session under a caller-chosen id. Fails loudly with
    /// `DuplicateId` instead of overwriting an in-flight session.
    pub async fn create_with_id(&self, id: String) -> Result<()> {
        {
            let mut sessions = self.sessions.write().await;
            if sessions.contains_key(&id) {
                return Err(UplinkError::DuplicateId { id });
            }
            sessions.insert(
                id.clone(),
                Arc::new(SessionEntry {
                    id: id.clone(),
                    started_at: Utc::now(),
                    state: Mutex::new(SessionState {
                        status: SessionStatus::Collecting,
                        byte_count: 0,
                        finished_at: None,
                        outcome: None,
                    }),
                }),
            );
        }

        self.sink.create(&id).await?;
        info!("Session created: {}", id);
        Ok(())
    }

    /// Append a chunk to a collecting session's byte sink.
    pub async fn append(&self, id: &str, bytes: &[u8]) -> Result<AppendReceipt> {
        let entry = self.entry(id).await?;
        let mut state = entry.state.lock().await;

        if state.status != SessionStatus::Collecting {
            return Err(UplinkError::InvalidState {
                id: id.to_string(),
                status: state.status.as_str(),
                expected: SessionStatus::Collecting.as_str(),
            });
        }
        if bytes.is_empty() {
            return Err(UplinkError::EmptyChunk { id: id.to_string() });
        }

        // Sink write happens under the session lock so chunks land in
        // arrival order and byte_count stays consistent with the sink.
        self.sink.append(id, bytes).await?;
        state.byte_count += bytes.len() as u64;

        Ok(AppendReceipt {
            received_bytes: bytes.len() as u64,
            total_bytes: state.byte_count,
        })
    }

    /// Atomic `Collecting -> Processing` check-and-set. Returns `Started`
    /// at most once per session, ever.
    pub async fn begin_processing(&self, id: &str) -> Result<Begin> {
        let entry = self.entry(id).await?;
        let mut state = entry.state.lock().await;

        match state.status {
            SessionStatus::Collecting => {
                state.status = SessionStatus::Processing;
                info!("Session {} entering processing ({} bytes)", id, state.byte_count);
                Ok(Begin::Started)
            }
            SessionStatus::Processing | SessionStatus::Done => Ok(Begin::AlreadyStarted),
        }
    }

    /// Record the terminal outcome for a `Processing` session.
    pub async fn complete(&self, id: &str, outcome: Outcome) -> Result<()> {
        let entry = self.entry(id).await?;
        let mut state = entry.state.lock().await;

        if state.status != SessionStatus::Processing {
            return Err(UplinkError::InvalidState {
                id: id.to_string(),
                status: state.status.as_str(),
                expected: SessionStatus::Processing.as_str(),
            });
        }

        state.status = SessionStatus::Done;
        state.finished_at = Some(Utc::now());
        state.outcome = Some(outcome);
        info!("Session {} done", id);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Option<SessionSnapshot> {
        let entry = {
            let sessions = self.sessions.read().await;
            sessions.get(id).cloned()
        };
        match entry {
            Some(entry) => Some(entry.snapshot().await),
            None => None,
        }
    }

    pub async fn all(&self) -> Vec<SessionSnapshot> {
        let entries: Vec<Arc<SessionEntry>> = {
            let sessions = self.sessions.read().await;
            sessions.values().cloned().collect()
        };

        let mut snapshots = Vec::with_capacity(entries.len());
        for entry in entries {
            snapshots.push(entry.snapshot().await);
        }
        snapshots
    }

    async fn entry(&self, id: &str) -> Result<Arc<SessionEntry>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| UplinkError::NotFound { id: id.to_string() })
    }
}
