//! Application error types for configuration, preferences, and payloads.
use thiserror::Error;

/// Top-level application error type.
///
/// Expected server outcomes (non-success statuses, unreachable hosts) are not
/// errors; they travel as values through the client's transport layer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}
