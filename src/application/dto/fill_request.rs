//! Parsing of the `/fill/{width}/{height}/{source}` path remainder.

use url::Url;

use crate::domain::entities::{ImageExtension, MAX_DIMENSION, MIN_DIMENSION, PreviewRequest};
use crate::domain::errors::ValidationError;

/// Builds a [`PreviewRequest`] from the path after `/fill/`.
///
/// `rest` is `{width}/{height}/{source}` where `source` is a URL without its
/// scheme; `protocol` is prepended to it. Checks run in path order so the
/// first bad segment decides the error.
///
/// # Errors
///
/// Returns the `ValidationError` for the first segment that is rejected.
pub fn parse_fill_request(rest: &str, protocol: &str) -> Result<PreviewRequest, ValidationError> {
    let mut parts = rest.splitn(3, '/');
    let (Some(raw_width), Some(raw_height)) = (parts.next(), parts.next()) else {
        return Err(ValidationError::MalformedPath(rest.to_string()));
    };

    let width = parse_dimension(raw_width)
        .ok_or_else(|| ValidationError::WrongWidth(raw_width.to_string()))?;
    let height = parse_dimension(raw_height)
        .ok_or_else(|| ValidationError::WrongHeight(raw_height.to_string()))?;

    let source = parts.next().unwrap_or_default();
    if source.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let url =
        Url::parse(&format!("{protocol}://{source}")).map_err(|_| ValidationError::WrongUrl)?;
    if url.host().is_none() {
        return Err(ValidationError::WrongUrl);
    }

    let extension = parse_extension(&url)?;

    Ok(PreviewRequest::new(width, height, url, extension))
}

fn parse_dimension(raw: &str) -> Option<u32> {
    raw.parse::<u32>()
        .ok()
        .filter(|value| (MIN_DIMENSION..=MAX_DIMENSION).contains(value))
}

fn parse_extension(url: &Url) -> Result<ImageExtension, ValidationError> {
    let file_name = url.path().rsplit('/').next().unwrap_or_default();
    let raw = file_name
        .rfind('.')
        .map(|dot| &file_name[dot + 1..])
        .filter(|ext| !ext.is_empty())
        .ok_or(ValidationError::EmptyExtension)?;

    ImageExtension::parse(raw)
        .ok_or_else(|| ValidationError::WrongExtension(raw.to_ascii_lowercase()))
}
