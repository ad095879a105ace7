//! plantpal-relay library - Plant identification relay
//!
//! A single-route HTTP service: accept one uploaded image, forward it to the
//! identification API with server-held credentials, return the upstream
//! status and body unchanged.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use plantpal_common::api::RELAY_PATH;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod upstream;

pub use crate::config::{RelayArgs, RelayConfig};
pub use crate::error::{RelayError, RelayResult};

use crate::upstream::UpstreamClient;

/// Application state shared across HTTP handlers
///
/// Read-only after startup; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        let upstream = UpstreamClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
        })
    }
}

/// Build application router
///
/// Exactly one route. CORS is open to any origin because the page calling
/// the relay is served from elsewhere.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route(RELAY_PATH, post(api::relay_identify))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
