//! Drop guard for transient artifacts.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

/// A fetched source file that is deleted when the guard goes out of scope.
///
/// Dropping covers success, failure and cancellation of the owning request.
#[derive(Debug)]
pub struct TransientArtifact {
    name: String,
    path: PathBuf,
    armed: bool,
}

impl TransientArtifact {
    pub(super) const fn new(name: String, path: PathBuf) -> Self {
        Self {
            name,
            path,
            armed: true,
        }
    }

    /// Artifact name inside storage.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disarms the guard and hands the name to a new owner.
    #[must_use]
    pub fn keep(mut self) -> String {
        self.armed = false;
        std::mem::take(&mut self.name)
    }
}

impl Drop for TransientArtifact {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => trace!(name = %self.name, "Removed transient artifact"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(name = %self.name, error = %e, "Failed to remove transient artifact"),
        }
    }
}
