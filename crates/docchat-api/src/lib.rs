//! DocChat API - HTTP server for PDF chat
//!
//! Exposes upload, chat, listing, and deletion endpoints over axum, and
//! wires the retrieval pipeline into shared application state.

pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::create_router_for_testing;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router with body limit, CORS, and request tracing
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body_size = state.config.server.max_body_size;
    let cors = state
        .config
        .server
        .cors_enabled
        .then(|| cors_layer(&state.config.server.cors_origins));

    let mut app = routes::api_routes()
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors {
        app = app.layer(cors);
    }
    app
}

/// Permissive CORS unless explicit origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}
