//! Remote API adapter.
//!
//! Every call resolves to exactly one [`ApiOutcome`]: a payload, a
//! non-success status, or a transport-level failure.

mod http;

pub use http::HttpTransport;

use crate::error::ClientError;
use reqwest::Url;
use vaultpaste_core::models::{CreateSnippetRequest, CreatedSnippet, Snippet, SnippetSummary};

/// A non-success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
    /// Final URL when the service answered by redirecting elsewhere.
    pub redirected_to: Option<Url>,
}

impl ApiFailure {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            redirected_to: None,
        }
    }

    pub fn redirected(status: u16, target: Url) -> Self {
        Self {
            status,
            redirected_to: Some(target),
        }
    }
}

/// Uniform result of one API call.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    /// Success status with a decoded payload.
    Ok(T),
    /// The service answered with a non-success status (or redirected away).
    Failed(ApiFailure),
    /// No usable response: DNS, connect, timeout, or an undecodable body.
    NetworkError(String),
}

impl<T> ApiOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiOutcome::Ok(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Ok(value) => ApiOutcome::Ok(f(value)),
            ApiOutcome::Failed(failure) => ApiOutcome::Failed(failure),
            ApiOutcome::NetworkError(message) => ApiOutcome::NetworkError(message),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiOutcome::Ok(_) => "ok",
            ApiOutcome::Failed(_) => "failed",
            ApiOutcome::NetworkError(_) => "network_error",
        }
    }
}

/// Operations the controller needs from the snippet service.
///
/// Implementations block; the backend worker calls them off the UI thread.
pub trait SnippetApi: Send + Sync {
    fn create(&self, request: &CreateSnippetRequest) -> ApiOutcome<CreatedSnippet>;

    /// Fetch one snippet, bypassing intermediate caches.
    fn fetch(&self, id: &str) -> ApiOutcome<Snippet>;

    /// List the caller's active snippets, bypassing intermediate caches.
    fn history(&self) -> ApiOutcome<Vec<SnippetSummary>>;

    fn delete(&self, id: &str) -> ApiOutcome<()>;
}

/// Append path segments to `server`, percent-encoding each one.
///
/// # Errors
/// Returns [`ClientError::InvalidServerUrl`] when `server` does not parse or
/// cannot carry a path.
pub fn api_url(server: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = server.clone();
    let mut path = url
        .path_segments_mut()
        .map_err(|_| ClientError::InvalidServerUrl {
            url: server.to_string(),
            reason: "URL cannot be used as an API base".to_string(),
        })?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

/// Parse and normalize a server URL (trailing slashes dropped).
///
/// # Errors
/// Returns [`ClientError::InvalidServerUrl`] on parse failure or when the URL
/// is not `http`/`https`.
pub fn parse_server_url(server: &str) -> Result<Url, ClientError> {
    let trimmed = server.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|err| ClientError::InvalidServerUrl {
        url: server.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidServerUrl {
            url: server.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}
