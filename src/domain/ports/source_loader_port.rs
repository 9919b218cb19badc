//! Port for fetching source images.

use async_trait::async_trait;
use url::Url;

use crate::domain::entities::{ForwardedHeaders, ImageExtension};
use crate::domain::errors::PreviewError;

/// Fetches a remote image into artifact storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceLoaderPort: Send + Sync {
    /// Downloads `url` and stores the body under a fresh transient name.
    ///
    /// Returns the artifact name. The caller owns the file from then on and
    /// is responsible for removing it.
    async fn fetch(
        &self,
        url: &Url,
        extension: ImageExtension,
        headers: &ForwardedHeaders,
    ) -> Result<String, PreviewError>;
}
