// Server module - axum router and shared application state

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::Config;
use crate::watermark::WatermarkEngine;

pub mod handlers;
pub mod multipart;

/// Shared application state handed to every handler.
///
/// Cloning is cheap: the engine and configuration sit behind `Arc`s.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: WatermarkEngine,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            engine: WatermarkEngine::new(config.engine_config()),
            config: Arc::new(config),
        }
    }
}

/// Build the full application router with its middleware layers.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_body_size;

    Router::new()
        .route("/", get(handlers::redirect_to_docs))
        .route("/docs", get(handlers::docs))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/png_watermark/", post(handlers::png_watermark))
        .route("/text_watermark/", post(handlers::text_watermark))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
