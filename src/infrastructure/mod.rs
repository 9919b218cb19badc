//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Fetching, resizing and caching of previews.
pub mod image;
/// Artifact directory access.
pub mod storage;

pub use config::{AppConfig, CliArgs, ConfigLoader, LogLevel};
pub use image::{CacheStats, HttpSourceLoader, LanczosResizer, PreviewCache, SourceLoaderConfig};
pub use storage::{ArtifactStorage, TransientArtifact};
