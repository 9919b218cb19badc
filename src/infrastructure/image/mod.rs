//! Image handling infrastructure.
//!
//! This module provides:
//! - Source fetching over HTTP into transient artifacts
//! - Exact-size Lanczos rendering
//! - The LRU recency index over rendered previews

pub mod loader;
pub mod preview_cache;
pub mod resizer;

pub use loader::{HttpSourceLoader, SourceLoaderConfig};
pub use preview_cache::{CacheStats, DEFAULT_CAPACITY, PreviewCache};
pub use resizer::LanczosResizer;
