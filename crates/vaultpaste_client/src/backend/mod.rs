//! Backend worker wiring.
//!
//! This module exposes the command/event protocol plus the worker spawn helper
//! used by the controller's UI thread.

mod protocol;
mod worker;

pub use protocol::{ApiCmd, ApiEvent, RequestTicket, TicketCounter};
pub use worker::{spawn_backend, BackendHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ApiFailure, ApiOutcome, SnippetApi};
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use vaultpaste_core::models::{CreateSnippetRequest, CreatedSnippet, Snippet, SnippetSummary};

    #[derive(Default)]
    struct MemoryApi {
        snippets: Mutex<Vec<Snippet>>,
        next_id: Mutex<u32>,
    }

    impl SnippetApi for MemoryApi {
        fn create(&self, request: &CreateSnippetRequest) -> ApiOutcome<CreatedSnippet> {
            let mut next_id = self.next_id.lock().expect("id lock");
            *next_id += 1;
            let id = format!("snip-{}", next_id);
            let now = Utc::now();
            self.snippets.lock().expect("lock").push(Snippet {
                id: id.clone(),
                encrypted_content: request.content.clone(),
                language: request.language.clone(),
                title: request.title.clone(),
                creation_date: now,
                expiry_date: now + ChronoDuration::minutes(60),
            });
            ApiOutcome::Ok(CreatedSnippet { id })
        }

        fn fetch(&self, id: &str) -> ApiOutcome<Snippet> {
            match self.snippets.lock().expect("lock").iter().find(|s| s.id == id) {
                Some(snippet) => ApiOutcome::Ok(snippet.clone()),
                None => ApiOutcome::Failed(ApiFailure::status(404)),
            }
        }

        fn history(&self) -> ApiOutcome<Vec<SnippetSummary>> {
            let snippets = self.snippets.lock().expect("lock");
            ApiOutcome::Ok(snippets.iter().map(SnippetSummary::from).collect())
        }

        fn delete(&self, id: &str) -> ApiOutcome<()> {
            let mut snippets = self.snippets.lock().expect("lock");
            let before = snippets.len();
            snippets.retain(|s| s.id != id);
            if snippets.len() == before {
                ApiOutcome::Failed(ApiFailure::status(403))
            } else {
                ApiOutcome::Ok(())
            }
        }
    }

    fn recv_event(rx: &crossbeam_channel::Receiver<ApiEvent>) -> ApiEvent {
        rx.recv_timeout(Duration::from_secs(2))
            .expect("expected backend event")
    }

    #[test]
    fn backend_creates_fetches_lists_and_deletes() {
        let backend = spawn_backend(Arc::new(MemoryApi::default()));
        let mut tickets = TicketCounter::default();

        let create_ticket = tickets.issue();
        backend
            .cmd_tx
            .send(ApiCmd::CreateSnippet {
                ticket: create_ticket,
                request: CreateSnippetRequest::from_form("print('hi')", "python", "demo", "60"),
            })
            .expect("send create");
        let created_id = match recv_event(&backend.evt_rx) {
            ApiEvent::SnippetCreated {
                ticket,
                outcome: ApiOutcome::Ok(created),
            } => {
                assert_eq!(ticket, create_ticket);
                created.id
            }
            other => panic!("unexpected event: {:?}", other),
        };

        backend
            .cmd_tx
            .send(ApiCmd::FetchSnippet {
                ticket: tickets.issue(),
                id: created_id.clone(),
            })
            .expect("send fetch");
        match recv_event(&backend.evt_rx) {
            ApiEvent::SnippetFetched {
                outcome: ApiOutcome::Ok(snippet),
                ..
            } => {
                assert_eq!(snippet.encrypted_content, "print('hi')");
                assert_eq!(snippet.language, "python");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        backend
            .cmd_tx
            .send(ApiCmd::DeleteSnippet {
                ticket: tickets.issue(),
                id: created_id.clone(),
            })
            .expect("send delete");
        match recv_event(&backend.evt_rx) {
            ApiEvent::SnippetDeleted { id, outcome, .. } => {
                assert_eq!(id, created_id);
                assert_eq!(outcome, ApiOutcome::Ok(()));
            }
            other => panic!("unexpected event: {:?}", other),
        }

        backend
            .cmd_tx
            .send(ApiCmd::ListHistory {
                ticket: tickets.issue(),
            })
            .expect("send list");
        match recv_event(&backend.evt_rx) {
            ApiEvent::HistoryListed {
                outcome: ApiOutcome::Ok(items),
                ..
            } => assert!(items.is_empty()),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn backend_replies_in_command_order_with_original_tickets() {
        let backend = spawn_backend(Arc::new(MemoryApi::default()));
        let mut tickets = TicketCounter::default();
        let first = tickets.issue();
        let second = tickets.issue();
        assert!(second > first);

        backend
            .cmd_tx
            .send(ApiCmd::FetchSnippet {
                ticket: first,
                id: "missing".to_string(),
            })
            .expect("send fetch");
        backend
            .cmd_tx
            .send(ApiCmd::ListHistory { ticket: second })
            .expect("send list");

        let a = recv_event(&backend.evt_rx);
        let b = recv_event(&backend.evt_rx);
        assert_eq!(a.ticket(), first);
        assert!(matches!(
            a,
            ApiEvent::SnippetFetched {
                outcome: ApiOutcome::Failed(ApiFailure { status: 404, .. }),
                ..
            }
        ));
        assert_eq!(b.ticket(), second);
    }
}
