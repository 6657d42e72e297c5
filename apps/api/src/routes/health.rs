use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and model in use.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "job-optimizer-api",
        "model": state.llm.model_name(),
        "cache_enabled": state.config.cache_enabled,
        "cache_entries": state.llm.cached_entries()
    }))
}
