use std::sync::Arc;

use crate::dispatch::{JobDispatcher, LatestResult};
use crate::session::SessionRegistry;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub registry: Arc<SessionRegistry>,
    pub dispatcher: Arc<JobDispatcher>,
    pub latest: Arc<LatestResult>,
}
