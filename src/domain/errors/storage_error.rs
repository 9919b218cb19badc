//! Artifact storage error types.

use thiserror::Error;

/// Artifact storage error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No artifact with this name exists.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// The name would resolve outside the artifact directory.
    #[error("invalid artifact name: {0}")]
    InvalidName(String),

    /// Underlying filesystem failure.
    #[error("storage io error: {0}")]
    Io(String),
}
