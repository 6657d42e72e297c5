use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the response cache; clones share it.
    pub llm: LlmClient,
    pub config: Config,
}
