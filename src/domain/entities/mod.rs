//! Domain entity definitions.

mod artifact;
mod cache_key;
mod forwarded_headers;
mod image_extension;
mod preview;

pub use artifact::{ArtifactKind, ArtifactName, SCRATCH_PREFIX};
pub use cache_key::CacheKey;
pub use forwarded_headers::ForwardedHeaders;
pub use image_extension::ImageExtension;
pub use preview::{
    MAX_DIMENSION, MIN_DIMENSION, PreviewOrigin, PreviewRequest, ServedPreview,
};
