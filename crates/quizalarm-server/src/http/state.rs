//! Application state for the HTTP server.

use std::sync::Arc;
use std::time::Instant;

use crate::Repository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<Repository>,
    /// When the server started, for the uptime report
    pub started: Instant,
}

impl AppState {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self {
            repository,
            started: Instant::now(),
        }
    }
}
