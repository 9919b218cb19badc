//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{CacheKey, ImageExtension, PreviewRequest};
pub use errors::{ConfigError, PreviewError, StorageError, ValidationError};
pub use ports::{ImageResizerPort, SourceLoaderPort};
