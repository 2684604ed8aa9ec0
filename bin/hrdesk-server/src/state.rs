//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use hrdesk_rag::RagPipeline;
use minijinja::Environment;

use crate::config::Config;
use crate::entities::AnyStore;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Users, documents, sessions and messages.
    pub store: Arc<AnyStore>,
    /// Retrieval + generation chain. Cheap to clone; holds `Arc`s.
    pub rag: RagPipeline,
    /// Compiled HTML templates.
    pub templates: Arc<Environment<'static>>,
}
