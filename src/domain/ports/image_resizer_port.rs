//! Port for rendering previews.

use async_trait::async_trait;

use crate::domain::errors::PreviewError;

/// Turns a stored source artifact into a preview artifact of exact size.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageResizerPort: Send + Sync {
    /// Renders `source` at exactly `width`x`height` into `target`.
    ///
    /// Must not delete `source`.
    async fn transform(
        &self,
        source: &str,
        width: u32,
        height: u32,
        target: &str,
    ) -> Result<(), PreviewError>;
}
