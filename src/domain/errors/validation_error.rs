//! Request validation errors.

use thiserror::Error;

/// Reasons a fill request is rejected before any work is done.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ValidationError {
    #[error("wrong loading url: {0}")]
    MalformedPath(String),

    #[error("wrong width: {0}")]
    WrongWidth(String),

    #[error("wrong height: {0}")]
    WrongHeight(String),

    #[error("loading url is empty")]
    EmptyUrl,

    #[error("wrong url")]
    WrongUrl,

    #[error("loading image extension is empty")]
    EmptyExtension,

    #[error("loading image has wrong extension: {0}")]
    WrongExtension(String),
}
