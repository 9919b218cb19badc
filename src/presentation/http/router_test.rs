#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::num::NonZeroUsize;
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::application::FillPreviewUseCase;
    use crate::infrastructure::image::{
        HttpSourceLoader, LanczosResizer, PreviewCache, SourceLoaderConfig,
    };
    use crate::infrastructure::storage::ArtifactStorage;
    use crate::presentation::http::response::JSON_CONTENT_TYPE;
    use crate::presentation::http::{AppState, build_router};

    struct TestApp {
        router: Router,
        cache: Arc<PreviewCache>,
        _temp: TempDir,
    }

    async fn create_test_app(capacity: usize) -> TestApp {
        let temp = TempDir::new().unwrap();
        let storage = Arc::new(ArtifactStorage::open(temp.path().join("uploads")).await.unwrap());
        let cache = Arc::new(
            PreviewCache::rebuild_from_disk(storage.clone(), NonZeroUsize::new(capacity).unwrap())
                .await
                .unwrap(),
        );
        let loader =
            HttpSourceLoader::new(SourceLoaderConfig::default(), storage.clone()).unwrap();
        let resizer = LanczosResizer::new(storage.clone());
        let fill = FillPreviewUseCase::new(
            Arc::new(loader),
            Arc::new(resizer),
            cache.clone(),
            storage,
        );

        TestApp {
            router: build_router(AppState::new(Arc::new(fill), "http")),
            cache,
            _temp: temp,
        }
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    /// Host and port of the mock server, as it appears after `/fill/{w}/{h}/`.
    fn source_host(server: &MockServer) -> String {
        server.uri().trim_start_matches("http://").to_string()
    }

    async fn send(router: &Router, method: &str, uri: &str) -> axum::response::Response {
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn error_message(response: axum::response::Response) -> String {
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["data"].is_null());
        json["error"]["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_index_banner() {
        let app = create_test_app(10).await;

        let response = send(&app.router, "GET", "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).starts_with(crate::NAME));
    }

    #[tokio::test]
    async fn test_wrong_width_is_unprocessable() {
        let app = create_test_app(10).await;

        let response = send(&app.router, "GET", "/fill/abc/300/example.com/pic.jpg").await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(response).await, "wrong width: abc");
    }

    #[tokio::test]
    async fn test_wrong_height_is_unprocessable() {
        let app = create_test_app(10).await;

        let response = send(&app.router, "GET", "/fill/200/10000/example.com/pic.jpg").await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(response).await, "wrong height: 10000");
    }

    #[tokio::test]
    async fn test_empty_url_is_unprocessable() {
        let app = create_test_app(10).await;

        let response = send(&app.router, "GET", "/fill/200/300/").await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(response).await, "loading url is empty");
    }

    #[tokio::test]
    async fn test_bare_fill_is_malformed() {
        let app = create_test_app(10).await;

        let response = send(&app.router, "GET", "/fill").await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(response).await, "wrong loading url: ");
    }

    #[tokio::test]
    async fn test_wrong_extension_is_unprocessable() {
        let app = create_test_app(10).await;

        let response = send(&app.router, "GET", "/fill/200/300/example.com/font.ttf").await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            error_message(response).await,
            "loading image has wrong extension: ttf"
        );
    }

    #[tokio::test]
    async fn test_post_is_method_not_allowed() {
        let app = create_test_app(10).await;

        let response = send(&app.router, "POST", "/fill/200/300/example.com/pic.jpg").await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            error_message(response).await,
            "method POST not not supported on uri /fill/200/300/example.com/pic.jpg"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let app = create_test_app(10).await;

        let response = send(&app.router, "GET", "/resize/1/1/example.com/a.png").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            error_message(response).await,
            "uri /resize/1/1/example.com/a.png not found"
        );
    }

    #[tokio::test]
    async fn test_fill_resizes_and_caches() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/pic.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(jpeg_bytes(640, 480))
                    .insert_header("content-type", "image/jpeg"),
            )
            .expect(1)
            .mount(&upstream)
            .await;
        let app = create_test_app(10).await;
        let uri = format!("/fill/200/300/{}/images/pic.jpg", source_host(&upstream));

        let first = send(&app.router, "GET", &uri).await;

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers().get(header::CONTENT_TYPE).unwrap(), "image/jpeg");
        let length: usize = first
            .headers()
            .get(header::CONTENT_LENGTH)
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        let body = to_bytes(first.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), length);
        let served = image::load_from_memory(&body).unwrap();
        assert_eq!((served.width(), served.height()), (200, 300));

        let second = send(&app.router, "GET", &uri).await;

        assert_eq!(second.status(), StatusCode::OK);
        let again = to_bytes(second.into_body(), usize::MAX).await.unwrap();
        assert_eq!(again, body);
        let stats = app.cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_upstream_not_found_is_bad_gateway() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&upstream)
            .await;
        let app = create_test_app(10).await;
        let uri = format!("/fill/200/300/{}/missing.png", source_host(&upstream));

        let response = send(&app.router, "GET", &uri).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(error_message(response).await.contains("404"));
        assert!(app.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_undecodable_source_is_bad_gateway() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<html>nope</html>".to_vec()))
            .mount(&upstream)
            .await;
        let app = create_test_app(10).await;
        let uri = format!("/fill/50/50/{}/fake.gif", source_host(&upstream));

        let response = send(&app.router, "GET", &uri).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(error_message(response).await.starts_with("decode error"));
    }

    #[tokio::test]
    async fn test_capacity_evicts_older_preview() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes(64, 64)))
            .mount(&upstream)
            .await;
        let app = create_test_app(1).await;
        let host = source_host(&upstream);

        for name in ["a.jpg", "b.jpg"] {
            let response = send(&app.router, "GET", &format!("/fill/10/10/{host}/{name}")).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let stats = app.cache.stats().await;
        assert_eq!((stats.size, stats.evictions), (1, 1));
    }
}
