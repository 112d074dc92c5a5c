use std::sync::Arc;

use crate::config::Config;
use crate::export::{ArtifactGenerator, ExportHost, PreviewRegistry, SessionStore};
use crate::notify::Notifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Builder + serializer. Swapped for fakes in tests.
    pub generator: Arc<dyn ArtifactGenerator>,
    /// Receives finished downloads.
    pub host: Arc<dyn ExportHost>,
    pub previews: PreviewRegistry,
    pub notifier: Arc<dyn Notifier>,
}
