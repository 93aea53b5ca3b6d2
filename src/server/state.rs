//! Application state shared across HTTP handlers

use crate::core::Orchestrator;
use crate::storage::AudioStore;
use std::sync::Arc;

/// HTTP server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The request orchestration core
    pub orchestrator: Arc<Orchestrator>,
    /// Audio artifact store, used directly by the retrieval endpoint
    pub store: Arc<AudioStore>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(orchestrator: Arc<Orchestrator>, store: Arc<AudioStore>) -> Self {
        Self {
            orchestrator,
            store,
        }
    }
}
