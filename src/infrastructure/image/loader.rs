//! HTTP source loader.
//!
//! Downloads the original image into a transient artifact so the resizer can
//! decode it from disk.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

use crate::domain::entities::{ForwardedHeaders, ImageExtension};
use crate::domain::errors::PreviewError;
use crate::domain::ports::SourceLoaderPort;
use crate::infrastructure::storage::ArtifactStorage;

/// Default upstream timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the source loader.
#[derive(Debug, Clone)]
pub struct SourceLoaderConfig {
    /// Upper bound on a whole upstream exchange, body included.
    pub timeout: Duration,
    /// How long idle upstream connections are kept for reuse.
    pub pool_idle_timeout: Duration,
}

impl Default for SourceLoaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Fetches source images over HTTP into artifact storage.
pub struct HttpSourceLoader {
    http_client: reqwest::Client,
    storage: Arc<ArtifactStorage>,
    config: SourceLoaderConfig,
}

impl std::fmt::Debug for HttpSourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSourceLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpSourceLoader {
    /// Creates a loader with its own HTTP client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        config: SourceLoaderConfig,
        storage: Arc<ArtifactStorage>,
    ) -> Result<Self, PreviewError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .build()
            .map_err(|e| PreviewError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            storage,
            config,
        })
    }

    fn describe(e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("Request timed out: {e}")
        } else if e.is_connect() {
            format!("Connection failed: {e}")
        } else {
            format!("Request failed: {e}")
        }
    }
}

#[async_trait]
impl SourceLoaderPort for HttpSourceLoader {
    async fn fetch(
        &self,
        url: &Url,
        extension: ImageExtension,
        headers: &ForwardedHeaders,
    ) -> Result<String, PreviewError> {
        let mut request = self.http_client.get(url.clone());
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }

        debug!(url = %url, forwarded = headers.len(), "Downloading source image");

        let mut response = request.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Source request failed");
            PreviewError::Network(Self::describe(&e))
        })?;

        if response.status() != StatusCode::OK {
            warn!(url = %url, status = %response.status(), "Source host refused image");
            return Err(PreviewError::Upstream(format!(
                "HTTP {}: {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let transient = self.storage.create_transient(extension);
        let mut file = tokio::fs::File::create(transient.path())
            .await
            .map_err(|e| PreviewError::Io(format!("Failed to create source file: {e}")))?;

        let mut size = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PreviewError::Network(Self::describe(&e)))?
        {
            size += chunk.len();
            file.write_all(&chunk)
                .await
                .map_err(|e| PreviewError::Io(format!("Failed to write source file: {e}")))?;
        }

        file.flush()
            .await
            .map_err(|e| PreviewError::Io(format!("Failed to flush source file: {e}")))?;

        debug!(url = %url, name = transient.name(), size, "Source image stored");

        Ok(transient.keep())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_test_loader(
        timeout: Duration,
    ) -> (HttpSourceLoader, Arc<ArtifactStorage>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(ArtifactStorage::open(temp_dir.path()).await.unwrap());
        let config = SourceLoaderConfig {
            timeout,
            ..SourceLoaderConfig::default()
        };
        let loader = HttpSourceLoader::new(config, storage.clone()).unwrap();
        (loader, storage, temp_dir)
    }

    fn source_url(server: &MockServer, file: &str) -> Url {
        Url::parse(&format!("{}/{file}", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_writes_body_under_random_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pic.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"image-bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        let (loader, storage, _temp) = create_test_loader(Duration::from_secs(5)).await;

        let name = loader
            .fetch(&source_url(&server, "pic.png"), ImageExtension::Png, &ForwardedHeaders::new())
            .await
            .unwrap();

        assert!(name.ends_with(".png"));
        assert!(!name.starts_with("pic"));
        let written = std::fs::read(storage.root().join(&name)).unwrap();
        assert_eq!(written, b"image-bytes");
    }

    #[tokio::test]
    async fn test_fetch_forwards_caller_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pic.jpg"))
            .and(header("authorization", "Bearer abc"))
            .and(header("x-request-id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        let (loader, _storage, _temp) = create_test_loader(Duration::from_secs(5)).await;
        let headers: ForwardedHeaders = [
            ("Authorization", "Bearer abc"),
            ("X-Request-Id", "42"),
            ("Host", "previewer.local"),
        ]
        .into_iter()
        .collect();

        let result = loader
            .fetch(&source_url(&server, "pic.jpg"), ImageExtension::Jpg, &headers)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_non_200_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let (loader, storage, _temp) = create_test_loader(Duration::from_secs(5)).await;

        let result = loader
            .fetch(
                &source_url(&server, "missing.gif"),
                ImageExtension::Gif,
                &ForwardedHeaders::new(),
            )
            .await;

        match result {
            Err(PreviewError::Upstream(message)) => assert!(message.contains("404")),
            other => panic!("Expected upstream error, got {other:?}"),
        }
        assert!(storage.list_artifact_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_success_codes_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let (loader, _storage, _temp) = create_test_loader(Duration::from_secs(5)).await;

        let result = loader
            .fetch(&source_url(&server, "pic.png"), ImageExtension::Png, &ForwardedHeaders::new())
            .await;

        assert!(matches!(result, Err(PreviewError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"late".to_vec())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;
        let (loader, storage, _temp) = create_test_loader(Duration::from_millis(200)).await;

        let result = loader
            .fetch(&source_url(&server, "slow.png"), ImageExtension::Png, &ForwardedHeaders::new())
            .await;

        assert!(matches!(result, Err(PreviewError::Network(_))));
        assert!(storage.list_artifact_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let (loader, _storage, _temp) = create_test_loader(Duration::from_secs(2)).await;
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let url = Url::parse(&format!("http://127.0.0.1:{port}/pic.png")).unwrap();

        let result = loader
            .fetch(&url, ImageExtension::Png, &ForwardedHeaders::new())
            .await;

        assert!(matches!(result, Err(PreviewError::Network(_))));
    }
}
