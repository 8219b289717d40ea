//! Snippet creation flow.
//!
//! The submit control moves `Ready -> Busy` on a valid submit and ends either
//! in the terminal `Created` state or back in `Ready` after a failure. A
//! redirect leaves it busy because navigation moves away from the form.

use crate::backend::RequestTicket;
use crate::clipboard::CopyButton;
use crate::transport::ApiOutcome;
use reqwest::Url;
use std::time::Duration;
use tracing::{info, warn};
use vaultpaste_core::models::{CreateSnippetRequest, CreatedSnippet};

pub const CREATE_LABEL: &str = "Create Secure Link";
pub const BUSY_LABEL: &str = "Encrypting...";
pub const CREATED_LABEL: &str = "Created!";

pub const EMPTY_CONTENT_ALERT: &str = "Content cannot be empty";
pub const CREATE_FAILED_ALERT: &str = "Error creating snippet";
pub const CREATE_NETWORK_ALERT: &str = "Network error";
/// Alert for the download-without-link path when there is nothing to save.
pub const EMPTY_DOWNLOAD_ALERT: &str = "Content is empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitButton {
    Ready,
    Busy,
    Created,
}

impl SubmitButton {
    pub fn label(self) -> &'static str {
        match self {
            SubmitButton::Ready => CREATE_LABEL,
            SubmitButton::Busy => BUSY_LABEL,
            SubmitButton::Created => CREATED_LABEL,
        }
    }

    pub fn is_enabled(self) -> bool {
        self == SubmitButton::Ready
    }
}

/// Result of activating the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Issue exactly this request.
    Send(CreateSnippetRequest),
    /// Rejected locally; show the alert, no network call.
    Rejected(&'static str),
    /// The control is disabled.
    Ignored,
}

/// What the controller must do with a create completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateCompletion {
    /// The success panel now shows this link.
    Created { link: String },
    /// Follow the service's redirect.
    Navigate(Url),
    /// Show the alert; the control is enabled again.
    Alert(&'static str),
    /// Not the request this form is waiting for.
    Stale,
}

/// Build `<origin><view_path>?id=<id>`.
///
/// `view_path` is absolute, so any path on `base` is replaced.
pub fn share_link(base: &Url, view_path: &str, id: &str) -> String {
    match base.join(view_path) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.query_pairs_mut().clear().append_pair("id", id);
            url.to_string()
        }
        Err(err) => {
            warn!("cannot join view path '{}': {}", view_path, err);
            format!(
                "{}{}?id={}",
                base.origin().ascii_serialization(),
                view_path,
                id
            )
        }
    }
}

/// Form state for the create tab.
#[derive(Debug, Clone)]
pub struct CreateFlow {
    pub content: String,
    pub title: String,
    button: SubmitButton,
    pending: Option<RequestTicket>,
    share_link: Option<String>,
    copy_button: CopyButton,
}

impl CreateFlow {
    pub fn new(copy_feedback: Duration) -> Self {
        Self {
            content: String::new(),
            title: String::new(),
            button: SubmitButton::Ready,
            pending: None,
            share_link: None,
            copy_button: CopyButton::new(copy_feedback),
        }
    }

    pub fn button(&self) -> SubmitButton {
        self.button
    }

    /// Link shown in the success panel; `None` while the panel is hidden.
    pub fn share_link(&self) -> Option<&str> {
        self.share_link.as_deref()
    }

    pub fn copy_button(&self) -> &CopyButton {
        &self.copy_button
    }

    pub fn copy_button_mut(&mut self) -> &mut CopyButton {
        &mut self.copy_button
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Activate the submit control.
    ///
    /// # Arguments
    /// - `language`, `expiry`: Current values of the form's dropdowns.
    /// - `ticket`: Ticket the caller will attach to the request if one is sent.
    pub fn submit(&mut self, language: &str, expiry: &str, ticket: RequestTicket) -> SubmitDecision {
        if !self.button.is_enabled() {
            return SubmitDecision::Ignored;
        }
        if self.content.is_empty() {
            return SubmitDecision::Rejected(EMPTY_CONTENT_ALERT);
        }
        self.button = SubmitButton::Busy;
        self.pending = Some(ticket);
        SubmitDecision::Send(CreateSnippetRequest::from_form(
            &self.content,
            language,
            &self.title,
            expiry,
        ))
    }

    /// Apply the response for `ticket`.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        outcome: ApiOutcome<CreatedSnippet>,
        base: &Url,
        view_path: &str,
    ) -> CreateCompletion {
        if self.pending != Some(ticket) {
            return CreateCompletion::Stale;
        }
        self.pending = None;
        match outcome {
            ApiOutcome::Ok(created) => {
                let link = share_link(base, view_path, &created.id);
                info!(id = %created.id, "snippet created");
                self.share_link = Some(link.clone());
                self.button = SubmitButton::Created;
                CreateCompletion::Created { link }
            }
            ApiOutcome::Failed(failure) => match failure.redirected_to {
                Some(target) => {
                    info!(target = %target, "create redirected");
                    CreateCompletion::Navigate(target)
                }
                None => {
                    warn!(status = failure.status, "create failed");
                    self.button = SubmitButton::Ready;
                    CreateCompletion::Alert(CREATE_FAILED_ALERT)
                }
            },
            ApiOutcome::NetworkError(message) => {
                warn!("create network error: {}", message);
                self.button = SubmitButton::Ready;
                CreateCompletion::Alert(CREATE_NETWORK_ALERT)
            }
        }
    }
}
