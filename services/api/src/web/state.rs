//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::pipeline::CitationPipeline;
use seogenix_core::ports::CitationStore;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CitationPipeline>,
    pub store: Arc<dyn CitationStore>,
    pub config: Arc<Config>,
}
