//! Artifact naming rules for the storage directory.

use std::fmt;

use uuid::Uuid;

use super::{CacheKey, ImageExtension};

/// Prefix of scratch files the resizer encodes into before the final rename.
pub const SCRATCH_PREFIX: &str = ".render-";

/// Length of a transient name stem (simple-formatted UUID v4).
const TRANSIENT_STEM_LEN: usize = 32;

/// Name of a file inside the artifact directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(String);

/// What a file found in the artifact directory represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A finished preview, `<cacheKey><ext>`.
    Preview(CacheKey, ImageExtension),
    /// A fetched source awaiting resize, `<randomToken><ext>`.
    Transient,
    /// A half-written encoder output.
    Scratch,
    /// Anything the previewer did not create.
    Foreign,
}

impl ArtifactName {
    /// Name of the finished preview for `key`.
    #[must_use]
    pub fn preview(key: &CacheKey, extension: ImageExtension) -> Self {
        Self(format!("{key}{extension}"))
    }

    /// Fresh random name for a fetched source.
    ///
    /// Never derived from request input, so it cannot collide with a
    /// preview that another request is writing.
    #[must_use]
    pub fn transient(extension: ImageExtension) -> Self {
        Self(format!("{}{extension}", Uuid::new_v4().simple()))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Classifies a raw file name found on disk.
    #[must_use]
    pub fn classify(name: &str) -> ArtifactKind {
        if name.starts_with(SCRATCH_PREFIX) {
            return ArtifactKind::Scratch;
        }

        let Some((stem, ext)) = name.rsplit_once('.') else {
            return ArtifactKind::Foreign;
        };
        let Some(extension) = ImageExtension::parse(ext) else {
            return ArtifactKind::Foreign;
        };
        if ext != extension.as_str() {
            return ArtifactKind::Foreign;
        }

        if let Some(key) = CacheKey::parse(stem) {
            ArtifactKind::Preview(key, extension)
        } else if stem.len() == TRANSIENT_STEM_LEN
            && stem.bytes().all(|b| b.is_ascii_hexdigit())
        {
            ArtifactKind::Transient
        } else {
            ArtifactKind::Foreign
        }
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
