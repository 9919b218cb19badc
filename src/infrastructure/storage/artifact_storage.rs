//! Filesystem-backed artifact store.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, trace, warn};

use super::TransientArtifact;
use crate::domain::entities::{ArtifactName, ImageExtension};
use crate::domain::errors::StorageError;

/// Flat directory of preview and transient artifacts.
///
/// Every path handed out is a direct child of the root.
#[derive(Debug)]
pub struct ArtifactStorage {
    root: PathBuf,
}

impl ArtifactStorage {
    /// Opens the store, creating the directory if needed.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::Io(format!(
                "Failed to create artifact dir {}: {e}",
                root.display()
            ))
        })?;
        debug!(path = %root.display(), "Artifact storage ready");
        Ok(Self { root })
    }

    /// Returns the artifact directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path `name` would occupy, without touching the disk.
    ///
    /// # Errors
    /// Returns `InvalidName` if `name` is not a plain file name.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => Err(StorageError::InvalidName(name.to_string())),
        }
    }

    /// Lists the names of regular files, in directory order.
    ///
    /// # Errors
    /// Returns error if the directory cannot be read.
    pub async fn list_artifact_names(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to read artifact dir: {e}")))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Io(format!("Failed to read entry: {e}")))?
        {
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if !is_file {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => trace!(name = ?raw, "Skipping non UTF-8 file name"),
            }
        }

        Ok(names)
    }

    /// Checks whether an artifact exists.
    pub async fn exists(&self, name: &str) -> bool {
        match self.path_for(name) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Deletes an artifact. Deleting a missing artifact succeeds.
    ///
    /// # Errors
    /// Returns error if the name is invalid or the file cannot be removed.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                trace!(name, "Deleted artifact");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(name, error = %e, "Failed to delete artifact");
                Err(StorageError::Io(format!("Failed to delete {name}: {e}")))
            }
        }
    }

    /// Resolves an existing artifact to its absolute path.
    ///
    /// # Errors
    /// Returns `NotFound` if no regular file with this name exists.
    pub async fn resolve_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let path = self.path_for(name)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StorageError::NotFound(name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(name, "Artifact not found");
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::Io(format!("Failed to stat {name}: {e}"))),
        }
    }

    /// Reserves a fresh transient name. The file, once written, is removed
    /// when the returned guard drops.
    #[must_use]
    pub fn create_transient(&self, extension: ImageExtension) -> TransientArtifact {
        let name = ArtifactName::transient(extension).into_inner();
        let path = self.root.join(&name);
        TransientArtifact::new(name, path)
    }

    /// Takes over cleanup of a transient artifact written by someone else.
    ///
    /// # Errors
    /// Returns `InvalidName` if `name` is not a plain file name.
    pub fn adopt_transient(&self, name: String) -> Result<TransientArtifact, StorageError> {
        let path = self.path_for(&name)?;
        Ok(TransientArtifact::new(name, path))
    }
}
