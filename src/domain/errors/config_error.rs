//! Configuration error types.

use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Neither an explicit nor a platform config directory is available.
    #[error("failed to determine config directory")]
    ConfigDirNotFound,

    /// Reading the config file failed.
    #[error("io error: {0}")]
    Io(String),

    /// A setting is out of its accepted range.
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Dotted setting name, e.g. `cache.capacity`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
