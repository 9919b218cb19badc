//! Preview request and result types.

use std::path::PathBuf;

use url::Url;

use super::{ArtifactName, CacheKey, ImageExtension};

/// Smallest accepted preview edge, in pixels.
pub const MIN_DIMENSION: u32 = 1;
/// Largest accepted preview edge, in pixels.
pub const MAX_DIMENSION: u32 = 9999;

/// A validated, normalized request for a fixed-size preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    width: u32,
    height: u32,
    url: Url,
    extension: ImageExtension,
    key: CacheKey,
}

impl PreviewRequest {
    /// Creates a request and derives its cache key.
    #[must_use]
    pub fn new(width: u32, height: u32, url: Url, extension: ImageExtension) -> Self {
        let key = CacheKey::derive(width, height, &url);
        Self {
            width,
            height,
            url,
            extension,
            key,
        }
    }

    /// Target width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Target height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Absolute source URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Extension of the source, reused for the preview.
    #[must_use]
    pub const fn extension(&self) -> ImageExtension {
        self.extension
    }

    /// Cache key for this request.
    #[must_use]
    pub const fn cache_key(&self) -> &CacheKey {
        &self.key
    }

    /// File name of the finished preview.
    #[must_use]
    pub fn artifact_name(&self) -> ArtifactName {
        ArtifactName::preview(&self.key, self.extension)
    }
}

/// Where a served preview came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOrigin {
    /// An artifact already indexed by the cache.
    Cache,
    /// Freshly fetched and resized for this request.
    Fresh,
}

impl std::fmt::Display for PreviewOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Fresh => write!(f, "fresh"),
        }
    }
}

/// A preview resolved on disk and ready to stream.
#[derive(Debug, Clone)]
pub struct ServedPreview {
    /// Cache key of the preview.
    pub key: CacheKey,
    /// Extension, which determines the content type.
    pub extension: ImageExtension,
    /// Absolute path of the artifact.
    pub path: PathBuf,
    /// Whether the pipeline ran for this request.
    pub origin: PreviewOrigin,
}
