//! Application state shared across all route handlers.
//!
//! AppState holds the injected services. It is passed to handlers via
//! axum's State extractor; all fields use `Arc` for cheap cloning across
//! handler tasks.

use std::sync::Arc;

use tome_chat::ChatOrchestrator;
use tome_core::config::TomeConfig;
use tome_store::DocumentStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<TomeConfig>,
    /// Vectorized document corpus.
    pub store: Arc<DocumentStore>,
    /// Chat routing and session memory.
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    /// Create a new AppState with the given components.
    pub fn new(
        config: TomeConfig,
        store: Arc<DocumentStore>,
        orchestrator: ChatOrchestrator,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            orchestrator: Arc::new(orchestrator),
        }
    }
}
