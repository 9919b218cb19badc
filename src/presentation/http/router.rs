//! Route table and shared state.

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::application::FillPreviewUseCase;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Preview pipeline.
    pub fill: Arc<FillPreviewUseCase>,
    /// Scheme attached to scheme-less source URLs.
    pub protocol: Arc<str>,
}

impl AppState {
    /// Creates the handler state.
    pub fn new(fill: Arc<FillPreviewUseCase>, protocol: impl Into<Arc<str>>) -> Self {
        Self {
            fill,
            protocol: protocol.into(),
        }
    }
}

/// Builds the application router.
///
/// The fill routes accept every method so that non-GET requests get the
/// JSON 405 body instead of axum's empty one.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/fill", any(handlers::fill))
        .route("/fill/", any(handlers::fill))
        .route("/fill/{*rest}", any(handlers::fill))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
