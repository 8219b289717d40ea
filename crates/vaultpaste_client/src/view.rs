//! Single snippet view flow.
//!
//! The page resolves its snippet id once from the navigation URL, fetches it,
//! and ends in exactly one of `Content` or `Error`.

use crate::backend::RequestTicket;
use crate::transport::ApiOutcome;
use chrono::{DateTime, Utc};
use reqwest::Url;
use tracing::{debug, warn};
use vaultpaste_core::download::{prepare_download, FileDownload};
use vaultpaste_core::models::{format_local_timestamp, LanguageIcon, Snippet};

/// Read the `id` query parameter; blank values count as absent.
pub fn snippet_id_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Render-ready projection of a fetched snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDisplay {
    /// Literal text; hosts must not interpret markup in it.
    pub code: String,
    pub badge: String,
    pub icon: LanguageIcon,
    /// Secondary label; `None` means the label is not rendered at all.
    pub title: Option<String>,
    pub expires: String,
}

impl SnippetDisplay {
    pub fn from_snippet(snippet: &Snippet) -> Self {
        let tag = snippet.language_tag();
        Self {
            code: snippet.encrypted_content.clone(),
            badge: tag.display_name().into_owned(),
            icon: tag.icon(),
            title: snippet.display_title().map(str::to_string),
            expires: format_local_timestamp(snippet.expiry_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Content(SnippetDisplay),
    Error,
}

/// State owned by one view page.
#[derive(Debug, Clone)]
pub struct ViewFlow {
    snippet_id: Option<String>,
    state: ViewState,
    pending: Option<RequestTicket>,
    snippet: Option<Snippet>,
}

impl ViewFlow {
    /// Start a view page for `url`.
    ///
    /// Without an id the page is in `Error` immediately and no fetch is due.
    pub fn open(url: &Url, ticket: RequestTicket) -> Self {
        match snippet_id_from_url(url) {
            Some(id) => Self {
                snippet_id: Some(id),
                state: ViewState::Loading,
                pending: Some(ticket),
                snippet: None,
            },
            None => {
                debug!(url = %url, "view opened without id");
                Self {
                    snippet_id: None,
                    state: ViewState::Error,
                    pending: None,
                    snippet: None,
                }
            }
        }
    }

    /// Id to fetch, while a fetch is outstanding.
    pub fn pending_fetch(&self) -> Option<(RequestTicket, &str)> {
        match (self.pending, self.snippet_id.as_deref()) {
            (Some(ticket), Some(id)) => Some((ticket, id)),
            _ => None,
        }
    }

    pub fn snippet_id(&self) -> Option<&str> {
        self.snippet_id.as_deref()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ViewState::Loading
    }

    /// Whether the download action is offered.
    pub fn can_download(&self) -> bool {
        matches!(self.state, ViewState::Content(_))
    }

    /// Apply the fetch result.
    ///
    /// # Returns
    /// `false` when the completion belongs to a superseded request.
    pub fn complete(&mut self, ticket: RequestTicket, outcome: ApiOutcome<Snippet>) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        match outcome {
            ApiOutcome::Ok(snippet) => {
                self.state = ViewState::Content(SnippetDisplay::from_snippet(&snippet));
                self.snippet = Some(snippet);
            }
            ApiOutcome::Failed(failure) => {
                warn!(status = failure.status, "snippet lookup failed");
                self.fail();
            }
            ApiOutcome::NetworkError(message) => {
                warn!("snippet lookup network error: {}", message);
                self.fail();
            }
        }
        true
    }

    fn fail(&mut self) {
        self.snippet = None;
        self.state = ViewState::Error;
    }

    /// File for the already-fetched snippet; never touches the network.
    pub fn download(&self, now: DateTime<Utc>) -> Option<FileDownload> {
        if !self.can_download() {
            return None;
        }
        let snippet = self.snippet.as_ref()?;
        Some(prepare_download(
            &snippet.encrypted_content,
            &snippet.language,
            snippet.display_title(),
            now,
        ))
    }
}
