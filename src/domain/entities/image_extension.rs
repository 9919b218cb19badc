//! Allow-listed image extensions.

use std::fmt;
use std::path::Path;

/// File extension of a source image and of the preview rendered from it.
///
/// Only the formats the previewer can both decode and re-encode are
/// representable, so an unsupported extension cannot reach the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageExtension {
    /// `.jpg`
    Jpg,
    /// `.jpeg`
    Jpeg,
    /// `.png`
    Png,
    /// `.gif`
    Gif,
}

impl ImageExtension {
    /// Every supported extension.
    pub const ALL: [Self; 4] = [Self::Jpg, Self::Jpeg, Self::Png, Self::Gif];

    /// Parses an extension case-insensitively, with or without a leading dot.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.strip_prefix('.').unwrap_or(raw);
        Self::ALL
            .into_iter()
            .find(|ext| ext.as_str().eq_ignore_ascii_case(raw))
    }

    /// Extracts the extension from a file name such as `abc.png`.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Lowercase extension without the dot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    /// Lowercase extension with the leading dot, as used in artifact names.
    #[must_use]
    pub const fn dotted(self) -> &'static str {
        match self {
            Self::Jpg => ".jpg",
            Self::Jpeg => ".jpeg",
            Self::Png => ".png",
            Self::Gif => ".gif",
        }
    }

    /// MIME type served for artifacts with this extension.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpg | Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dotted())
    }
}
