//! Artifact storage on the local filesystem.

mod artifact_storage;
mod transient;

pub use artifact_storage::ArtifactStorage;
pub use transient::TransientArtifact;
