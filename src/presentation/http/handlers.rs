//! Route handlers.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::Response;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use super::response::ApiError;
use super::router::AppState;
use crate::application::PipelineStage;
use crate::application::dto::parse_fill_request;
use crate::domain::entities::{ForwardedHeaders, ServedPreview};

const FILL_PREFIX: &str = "/fill";

/// `GET /`: name and version banner.
pub async fn index() -> String {
    format!("{} {}\n", crate::NAME, crate::VERSION)
}

/// `/fill/{width}/{height}/{source}` for any method.
///
/// # Errors
/// Returns the JSON error envelope for rejected requests and pipeline failures.
pub async fn fill(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if method != Method::GET {
        warn!(method = %method, path = %uri.path(), "Unsupported method on fill route");
        return Err(ApiError::method_not_allowed(&method, uri.path()));
    }

    let rest = fill_remainder(&uri);
    let request = parse_fill_request(&rest, &state.protocol).map_err(|e| {
        warn!(path = %uri.path(), error = %e, "Rejected fill request");
        ApiError::from(e)
    })?;

    let forwarded = forward_headers(&headers);
    let preview = state.fill.execute(&request, &forwarded).await?;

    info!(
        key = %preview.key,
        origin = %preview.origin,
        width = request.width(),
        height = request.height(),
        "Serving preview"
    );
    stream_preview(&preview).await
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("uri {} not found", uri.path()))
}

/// Path after `/fill/`, with the query string kept as part of the source URL.
fn fill_remainder(uri: &Uri) -> String {
    let path = uri.path().strip_prefix(FILL_PREFIX).unwrap_or_default();
    let path = path.strip_prefix('/').unwrap_or(path);
    match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}

fn forward_headers(headers: &HeaderMap) -> ForwardedHeaders {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
        .collect()
}

async fn stream_preview(preview: &ServedPreview) -> Result<Response, ApiError> {
    let missing = |e: std::io::Error| {
        warn!(
            stage = %PipelineStage::Serving,
            key = %preview.key,
            error = %e,
            "Preview vanished before it could be served"
        );
        ApiError::not_found(format!("preview {} not found", preview.key))
    };

    let file = File::open(&preview.path).await.map_err(missing)?;
    let length = file.metadata().await.map_err(missing)?.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, preview.extension.mime_type())
        .header(header::CONTENT_LENGTH, length.to_string())
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::internal(e.to_string()))
}
