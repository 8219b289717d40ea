//! Protocol types for the backend worker.

use crate::transport::ApiOutcome;
use vaultpaste_core::models::{CreateSnippetRequest, CreatedSnippet, Snippet, SnippetSummary};

/// Identifies one issued request so late completions can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic ticket source owned by the UI thread.
#[derive(Debug, Default)]
pub struct TicketCounter {
    next: u64,
}

impl TicketCounter {
    pub fn issue(&mut self) -> RequestTicket {
        self.next = self.next.wrapping_add(1);
        RequestTicket(self.next)
    }
}

/// Commands issued by the UI thread for the backend worker to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCmd {
    /// Create a snippet and report the share id.
    CreateSnippet {
        ticket: RequestTicket,
        request: CreateSnippetRequest,
    },
    /// Load one snippet for the view page.
    FetchSnippet { ticket: RequestTicket, id: String },
    /// Load the history list.
    ListHistory { ticket: RequestTicket },
    /// Delete a snippet by id.
    DeleteSnippet { ticket: RequestTicket, id: String },
    /// Persist content ahead of a raw download; the outcome never blocks it.
    SaveForDownload {
        ticket: RequestTicket,
        request: CreateSnippetRequest,
    },
}

/// Events produced by the backend worker and polled by the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEvent {
    SnippetCreated {
        ticket: RequestTicket,
        outcome: ApiOutcome<CreatedSnippet>,
    },
    SnippetFetched {
        ticket: RequestTicket,
        outcome: ApiOutcome<Snippet>,
    },
    HistoryListed {
        ticket: RequestTicket,
        outcome: ApiOutcome<Vec<SnippetSummary>>,
    },
    SnippetDeleted {
        ticket: RequestTicket,
        id: String,
        outcome: ApiOutcome<()>,
    },
    SavedForDownload {
        ticket: RequestTicket,
        outcome: ApiOutcome<CreatedSnippet>,
    },
}

impl ApiEvent {
    pub fn ticket(&self) -> RequestTicket {
        match self {
            ApiEvent::SnippetCreated { ticket, .. }
            | ApiEvent::SnippetFetched { ticket, .. }
            | ApiEvent::HistoryListed { ticket, .. }
            | ApiEvent::SnippetDeleted { ticket, .. }
            | ApiEvent::SavedForDownload { ticket, .. } => *ticket,
        }
    }
}

#[cfg(test)]
impl RequestTicket {
    pub(crate) fn for_test(value: u64) -> Self {
        RequestTicket(value)
    }
}
