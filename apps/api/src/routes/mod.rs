pub mod cache;
pub mod health;
pub mod middleware;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::analysis::handlers;
use crate::config::Config;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze-job", post(handlers::handle_analyze_job))
        .route("/match-resume", post(handlers::handle_match_resume))
        .route("/optimize", post(handlers::handle_optimize))
        .route(
            "/generate-cover-letter",
            post(handlers::handle_generate_cover_letter),
        )
        .route("/cache", delete(cache::handle_clear_cache))
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(from_fn(middleware::process_time))
        .with_state(state)
}

/// `*` allows any origin without credentials; an explicit list allows
/// credentials for exactly those origins.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
