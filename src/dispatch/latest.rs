use tokio::sync::RwLock;

use crate::session::Outcome;

/// Single-slot cache of the most recently completed outcome.
///
/// Overwritten on every completion, never merged; last write wins across
/// concurrent sessions.
#[derive(Default)]
pub struct LatestResult {
    slot: RwLock<Option<Outcome>>,
}

impl LatestResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, outcome: Outcome) {
        *self.slot.write().await = Some(outcome);
    }

    pub async fn get(&self) -> Option<Outcome> {
        self.slot.read().await.clone()
    }
}
