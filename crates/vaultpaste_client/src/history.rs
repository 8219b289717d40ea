//! History tab: list, open, and delete the caller's snippets.
//!
//! Row clicks resolve through one action table on the list container. The
//! table is rebuilt from scratch on every render, so rows never carry their
//! own handlers and a re-render cannot leave stale ones behind.

use crate::backend::RequestTicket;
use crate::transport::ApiOutcome;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use vaultpaste_core::models::{format_local_timestamp, SnippetSummary};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const EMPTY_MESSAGE: &str = "No active snippets found.";
pub const FAILED_MESSAGE: &str = "Failed to load history.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error.";
pub const UNTITLED: &str = "Untitled Snippet";
pub const DELETE_NETWORK_ALERT: &str = "Network error.";

pub fn delete_failed_alert(status: u16) -> String {
    format!("Failed to delete. Server returned: {}", status)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: String,
    pub title: String,
    pub language: String,
    pub created: String,
    pub expires: String,
}

impl HistoryRow {
    pub fn from_summary(summary: &SnippetSummary) -> Self {
        Self {
            id: summary.id.clone(),
            title: summary.display_title().unwrap_or(UNTITLED).to_string(),
            language: summary.language.clone(),
            created: format_local_timestamp(summary.creation_date),
            expires: format_local_timestamp(summary.expiry_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryState {
    #[default]
    Idle,
    Loading,
    Empty,
    Loaded(Vec<HistoryRow>),
    Failed,
    NetworkError,
}

impl HistoryState {
    /// Placeholder text for states without rows.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            HistoryState::Idle | HistoryState::Loaded(_) => None,
            HistoryState::Loading => Some(LOADING_MESSAGE),
            HistoryState::Empty => Some(EMPTY_MESSAGE),
            HistoryState::Failed => Some(FAILED_MESSAGE),
            HistoryState::NetworkError => Some(NETWORK_ERROR_MESSAGE),
        }
    }

    pub fn rows(&self) -> &[HistoryRow] {
        match self {
            HistoryState::Loaded(rows) => rows,
            _ => &[],
        }
    }
}

/// Which part of a row was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRole {
    Title,
    Delete,
}

/// Click target as rendered: a role plus the row's `data-id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
    pub role: TargetRole,
    pub data_id: String,
}

impl TargetKey {
    pub fn title(id: impl Into<String>) -> Self {
        Self {
            role: TargetRole::Title,
            data_id: id.into(),
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            role: TargetRole::Delete,
            data_id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Open(String),
    Delete(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteCompletion {
    /// Deleted; run the full load procedure again.
    Reload,
    /// Show the alert; the list stays as rendered.
    Alert(String),
    Stale,
}

#[derive(Debug, Default)]
pub struct HistoryList {
    state: HistoryState,
    actions: HashMap<TargetKey, RowAction>,
    active_load: Option<RequestTicket>,
    /// In-flight deletes, ticket to row id.
    pending_deletes: HashMap<RequestTicket, String>,
}

impl HistoryList {
    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.active_load.is_some()
    }

    pub fn has_pending_deletes(&self) -> bool {
        !self.pending_deletes.is_empty()
    }

    pub fn is_delete_pending(&self, id: &str) -> bool {
        self.pending_deletes.values().any(|pending| pending == id)
    }

    /// Number of registered click targets.
    pub fn target_count(&self) -> usize {
        self.actions.len()
    }

    /// Show the placeholder and remember `ticket` as the only load whose
    /// result may render.
    pub fn begin_load(&mut self, ticket: RequestTicket) {
        self.state = HistoryState::Loading;
        self.actions.clear();
        self.active_load = Some(ticket);
    }

    /// Apply a list response.
    ///
    /// # Arguments
    /// - `tab_active`: Whether the history tab is showing right now.
    ///
    /// # Returns
    /// `false` when the response was dropped as stale.
    pub fn complete_load(
        &mut self,
        ticket: RequestTicket,
        outcome: ApiOutcome<Vec<SnippetSummary>>,
        tab_active: bool,
    ) -> bool {
        if self.active_load != Some(ticket) {
            debug!(ticket = ticket.value(), "dropping superseded history response");
            return false;
        }
        self.active_load = None;
        if !tab_active {
            debug!(ticket = ticket.value(), "dropping history response for hidden tab");
            return false;
        }
        self.state = match outcome {
            ApiOutcome::Ok(items) if items.is_empty() => HistoryState::Empty,
            ApiOutcome::Ok(items) => {
                HistoryState::Loaded(items.iter().map(HistoryRow::from_summary).collect())
            }
            ApiOutcome::Failed(failure) => {
                warn!(status = failure.status, "history load failed");
                HistoryState::Failed
            }
            ApiOutcome::NetworkError(message) => {
                warn!("history network error: {}", message);
                HistoryState::NetworkError
            }
        };
        self.rebuild_actions();
        true
    }

    fn rebuild_actions(&mut self) {
        self.actions.clear();
        for row in self.state.rows() {
            self.actions
                .insert(TargetKey::title(&row.id), RowAction::Open(row.id.clone()));
            self.actions
                .insert(TargetKey::delete(&row.id), RowAction::Delete(row.id.clone()));
        }
    }

    /// Resolve a click on the list container.
    pub fn click(&self, target: &TargetKey) -> Option<RowAction> {
        self.actions.get(target).cloned()
    }

    /// Record a delete for `id`; returns `false` when one is already in flight.
    pub fn begin_delete(&mut self, ticket: RequestTicket, id: &str) -> bool {
        if self.is_delete_pending(id) {
            debug!(id = %id, "delete already in flight");
            return false;
        }
        info!(id = %id, "deleting snippet");
        self.pending_deletes.insert(ticket, id.to_string());
        true
    }

    pub fn complete_delete(
        &mut self,
        ticket: RequestTicket,
        id: &str,
        outcome: ApiOutcome<()>,
    ) -> DeleteCompletion {
        if self.pending_deletes.remove(&ticket).is_none() {
            return DeleteCompletion::Stale;
        }
        match outcome {
            ApiOutcome::Ok(()) => {
                info!(id = %id, "snippet deleted");
                DeleteCompletion::Reload
            }
            ApiOutcome::Failed(failure) => {
                warn!(id = %id, status = failure.status, "delete failed");
                DeleteCompletion::Alert(delete_failed_alert(failure.status))
            }
            ApiOutcome::NetworkError(message) => {
                warn!(id = %id, "delete network error: {}", message);
                DeleteCompletion::Alert(DELETE_NETWORK_ALERT.to_string())
            }
        }
    }
}
