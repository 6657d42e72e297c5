use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub cleared: usize,
}

/// DELETE /cache
/// Drops every cached model reply.
pub async fn handle_clear_cache(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let cleared = state.llm.clear_cache();
    info!("Response cache cleared ({cleared} entries)");
    Json(ClearCacheResponse { cleared })
}
