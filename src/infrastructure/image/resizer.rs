//! Exact-size preview rendering.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::entities::{ImageExtension, SCRATCH_PREFIX};
use crate::domain::errors::PreviewError;
use crate::domain::ports::ImageResizerPort;
use crate::infrastructure::storage::ArtifactStorage;

/// Resampling filter used for every preview.
pub const FILTER: FilterType = FilterType::Lanczos3;

/// Decodes a stored source and writes an exact-size preview next to it.
///
/// The preview is encoded into a scratch file and renamed into place, so a
/// reader never sees a partially written artifact even when two requests
/// render the same key at once.
#[derive(Debug)]
pub struct LanczosResizer {
    storage: Arc<ArtifactStorage>,
}

impl LanczosResizer {
    /// Creates a resizer working inside `storage`.
    #[must_use]
    pub const fn new(storage: Arc<ArtifactStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ImageResizerPort for LanczosResizer {
    async fn transform(
        &self,
        source: &str,
        width: u32,
        height: u32,
        target: &str,
    ) -> Result<(), PreviewError> {
        let extension = ImageExtension::from_file_name(target).ok_or_else(|| {
            PreviewError::Transform(format!("Unsupported preview extension: {target}"))
        })?;
        // A missing source is a failed render, not a missing preview.
        let source_path = self
            .storage
            .resolve_path(source)
            .await
            .map_err(|e| PreviewError::Transform(format!("Source unavailable: {e}")))?;
        let target_path = self
            .storage
            .path_for(target)
            .map_err(|e| PreviewError::Transform(format!("Bad preview target: {e}")))?;
        let scratch_dir = self.storage.root().to_path_buf();

        let job = RenderJob {
            source: source_path,
            target: target_path,
            scratch_dir,
            width,
            height,
            format: encoding_format(extension),
        };

        // The blocking job outlives a dropped request; the guard tells it to
        // stop before it publishes anything.
        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();
        let rendered = tokio::task::spawn_blocking(move || job.run(&cancel)).await;
        guard.disarm();

        rendered.map_err(|e| PreviewError::Transform(format!("Resize task panicked: {e}")))??;

        debug!(source, target, width, height, "Rendered preview");
        Ok(())
    }
}

const fn encoding_format(extension: ImageExtension) -> ImageFormat {
    match extension {
        ImageExtension::Jpg | ImageExtension::Jpeg => ImageFormat::Jpeg,
        ImageExtension::Png => ImageFormat::Png,
        ImageExtension::Gif => ImageFormat::Gif,
    }
}

struct RenderJob {
    source: PathBuf,
    target: PathBuf,
    scratch_dir: PathBuf,
    width: u32,
    height: u32,
    format: ImageFormat,
}

impl RenderJob {
    fn run(self, cancel: &CancellationToken) -> Result<(), PreviewError> {
        bail_if_cancelled(cancel)?;
        let decoded = decode(&self.source)?;
        bail_if_cancelled(cancel)?;
        let resized = decoded.resize_exact(self.width, self.height, FILTER);
        bail_if_cancelled(cancel)?;

        // JPEG has no alpha channel, GIF frames are RGBA.
        let encodable = match self.format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
            ImageFormat::Gif => DynamicImage::ImageRgba8(resized.to_rgba8()),
            _ => resized,
        };

        let mut scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempfile_in(&self.scratch_dir)
            .map_err(|e| PreviewError::Io(format!("Failed to create scratch file: {e}")))?;

        {
            let mut writer = BufWriter::new(scratch.as_file_mut());
            encodable
                .write_to(&mut writer, self.format)
                .map_err(|e| PreviewError::Transform(format!("Failed to encode preview: {e}")))?;
            writer
                .flush()
                .map_err(|e| PreviewError::Io(format!("Failed to write preview: {e}")))?;
        }

        // Dropping the scratch file removes it.
        bail_if_cancelled(cancel)?;
        scratch.persist(&self.target).map_err(|e| {
            warn!(target = %self.target.display(), error = %e.error, "Failed to publish preview");
            PreviewError::Io(format!("Failed to publish preview: {}", e.error))
        })?;

        Ok(())
    }
}

fn bail_if_cancelled(cancel: &CancellationToken) -> Result<(), PreviewError> {
    if cancel.is_cancelled() {
        debug!("Preview render cancelled");
        return Err(PreviewError::Transform("render cancelled".to_string()));
    }
    Ok(())
}

fn decode(path: &Path) -> Result<DynamicImage, PreviewError> {
    ImageReader::open(path)
        .map_err(|e| PreviewError::Io(format!("Failed to open source: {e}")))?
        .with_guessed_format()
        .map_err(|e| PreviewError::Io(format!("Failed to read source: {e}")))?
        .decode()
        .map_err(|e| PreviewError::Decode(format!("Failed to decode image: {e}")))
}
