//! Presentation layer exposing the pipeline over HTTP.

/// Routes, handlers and the error envelope.
pub mod http;

pub use http::{AppState, build_router, serve};
