use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every analysis runs independently.
#[derive(Clone)]
pub struct AppState {
    /// Completion transport. `LlmClient` in production, a scripted backend in tests.
    pub backend: Arc<dyn CompletionBackend>,
    pub config: Config,
}
