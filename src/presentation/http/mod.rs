//! HTTP surface: routes, handlers and the JSON error envelope.

pub mod handlers;
pub mod response;
pub mod router;
pub mod server;

mod router_test;

pub use response::ApiError;
pub use router::{AppState, build_router};
pub use server::{serve, shutdown_signal};
