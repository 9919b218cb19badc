//! Domain error types.

mod config_error;
mod preview_error;
mod storage_error;
mod validation_error;

pub use config_error::ConfigError;
pub use preview_error::PreviewError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;
