//! Fetch, resize and cache pipeline behind the fill endpoint.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::{
    ArtifactName, CacheKey, ForwardedHeaders, PreviewOrigin, PreviewRequest, ServedPreview,
};
use crate::domain::errors::PreviewError;
use crate::domain::ports::{ImageResizerPort, SourceLoaderPort};
use crate::infrastructure::image::{CacheStats, PreviewCache};
use crate::infrastructure::storage::ArtifactStorage;

/// Step of the pipeline a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Downloading the source image.
    Fetching,
    /// Rendering the preview.
    Resizing,
    /// Indexing the preview and resolving its path.
    Caching,
    /// Opening the preview for the response body.
    Serving,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetching => write!(f, "fetching"),
            Self::Resizing => write!(f, "resizing"),
            Self::Caching => write!(f, "caching"),
            Self::Serving => write!(f, "serving"),
        }
    }
}

/// Serves a preview from the cache or produces it on a miss.
#[derive(Clone)]
pub struct FillPreviewUseCase {
    loader: Arc<dyn SourceLoaderPort>,
    resizer: Arc<dyn ImageResizerPort>,
    cache: Arc<PreviewCache>,
    storage: Arc<ArtifactStorage>,
}

impl FillPreviewUseCase {
    /// Creates new fill preview use case.
    #[must_use]
    pub fn new(
        loader: Arc<dyn SourceLoaderPort>,
        resizer: Arc<dyn ImageResizerPort>,
        cache: Arc<PreviewCache>,
        storage: Arc<ArtifactStorage>,
    ) -> Self {
        Self {
            loader,
            resizer,
            cache,
            storage,
        }
    }

    /// Resolves a preview for `request`, running the pipeline on a miss.
    ///
    /// A cache hit whose file has disappeared is treated as a miss. Nothing is
    /// retried; the first failing stage ends the request.
    ///
    /// # Errors
    /// Returns the error of the stage that failed.
    pub async fn execute(
        &self,
        request: &PreviewRequest,
        headers: &ForwardedHeaders,
    ) -> Result<ServedPreview, PreviewError> {
        let key = request.cache_key();

        if let Some(extension) = self.cache.get(key).await {
            let name = ArtifactName::preview(key, extension);
            match self.storage.resolve_path(name.as_str()).await {
                Ok(path) => {
                    debug!(key = %key, "Serving cached preview");
                    return Ok(ServedPreview {
                        key: key.clone(),
                        extension,
                        path,
                        origin: PreviewOrigin::Cache,
                    });
                }
                Err(e) => debug!(key = %key, error = %e, "Indexed preview is gone, rebuilding"),
            }
        }

        self.render(request, headers).await
    }

    async fn render(
        &self,
        request: &PreviewRequest,
        headers: &ForwardedHeaders,
    ) -> Result<ServedPreview, PreviewError> {
        let key = request.cache_key();
        debug!(key = %key, url = %request.url(), "Rendering preview");

        let fetched = self
            .loader
            .fetch(request.url(), request.extension(), headers)
            .await
            .map_err(|e| failed(PipelineStage::Fetching, key, e))?;
        let source = self
            .storage
            .adopt_transient(fetched)
            .map_err(|e| failed(PipelineStage::Fetching, key, e.into()))?;

        let target = request.artifact_name();
        let rendered = self
            .resizer
            .transform(
                source.name(),
                request.width(),
                request.height(),
                target.as_str(),
            )
            .await;
        drop(source);
        rendered.map_err(|e| failed(PipelineStage::Resizing, key, e))?;

        self.cache.set(key.clone(), request.extension()).await;
        let path = self
            .storage
            .resolve_path(target.as_str())
            .await
            .map_err(|e| failed(PipelineStage::Caching, key, e.into()))?;

        Ok(ServedPreview {
            key: key.clone(),
            extension: request.extension(),
            path,
            origin: PreviewOrigin::Fresh,
        })
    }

    /// Returns cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Logs final cache statistics. Artifacts stay on disk for the next start.
    pub async fn shutdown(&self) {
        let stats = self.cache.stats().await;
        info!(%stats, "Preview pipeline shut down");
    }
}

fn failed(stage: PipelineStage, key: &CacheKey, error: PreviewError) -> PreviewError {
    warn!(stage = %stage, key = %key, error = %error, "Preview pipeline failed");
    error
}
