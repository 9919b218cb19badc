//! Errors raised by the fetch, resize and store pipeline.

use thiserror::Error;

use super::StorageError;

/// Pipeline error variants.
#[derive(Debug, Clone, Error)]
pub enum PreviewError {
    /// DNS, connect, timeout or body transfer failure.
    #[error("network error: {0}")]
    Network(String),

    /// The source host answered with something other than 200 OK.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Local write failure while storing a fetched or rendered image.
    #[error("io error: {0}")]
    Io(String),

    /// The fetched bytes are not a decodable image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Resampling or encoding failed.
    #[error("transform error: {0}")]
    Transform(String),

    /// Artifact lookup failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PreviewError {
    /// Returns whether the failure originates from the source image or its host.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Upstream(_) | Self::Decode(_) | Self::Transform(_)
        )
    }

    /// Returns whether the failure is a missing artifact.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound(_)))
    }
}
