//! Client-side error types.
use thiserror::Error;

/// Failures of the client's own machinery.
///
/// Server responses never become `ClientError`s; see
/// [`crate::transport::ApiOutcome`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Save failed: {0}")]
    Save(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    App(#[from] vaultpaste_core::AppError),
}
