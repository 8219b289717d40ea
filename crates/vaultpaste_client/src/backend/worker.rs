//! Background worker thread for network access.

use crate::backend::{ApiCmd, ApiEvent};
use crate::transport::SnippetApi;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Handle for sending commands to, and receiving events from, the backend worker.
pub struct BackendHandle {
    pub cmd_tx: Sender<ApiCmd>,
    pub evt_rx: Receiver<ApiEvent>,
}

impl BackendHandle {
    /// Wrap raw channels, for harnesses that play the worker's part.
    #[cfg(test)]
    pub(crate) fn from_test_channels(cmd_tx: Sender<ApiCmd>, evt_rx: Receiver<ApiEvent>) -> Self {
        Self { cmd_tx, evt_rx }
    }
}

fn run_command(api: &dyn SnippetApi, cmd: ApiCmd) -> ApiEvent {
    match cmd {
        ApiCmd::CreateSnippet { ticket, request } => ApiEvent::SnippetCreated {
            ticket,
            outcome: api.create(&request),
        },
        ApiCmd::FetchSnippet { ticket, id } => ApiEvent::SnippetFetched {
            ticket,
            outcome: api.fetch(&id),
        },
        ApiCmd::ListHistory { ticket } => ApiEvent::HistoryListed {
            ticket,
            outcome: api.history(),
        },
        ApiCmd::DeleteSnippet { ticket, id } => {
            let outcome = api.delete(&id);
            ApiEvent::SnippetDeleted {
                ticket,
                id,
                outcome,
            }
        }
        ApiCmd::SaveForDownload { ticket, request } => ApiEvent::SavedForDownload {
            ticket,
            outcome: api.create(&request),
        },
    }
}

/// Spawn the backend worker thread that performs blocking API calls.
///
/// All network I/O stays off the UI thread; the worker replies with
/// [`ApiEvent`] values that the controller polls. Commands run one at a time in
/// the order received. The worker exits once the command sender is dropped or
/// the event receiver goes away.
///
/// # Returns
/// A [`BackendHandle`] containing the command sender and event receiver.
///
/// # Panics
/// Panics if the worker thread cannot be spawned.
pub fn spawn_backend(api: Arc<dyn SnippetApi>) -> BackendHandle {
    let (cmd_tx, cmd_rx) = unbounded::<ApiCmd>();
    let (evt_tx, evt_rx) = unbounded::<ApiEvent>();

    thread::Builder::new()
        .name("vaultpaste-backend".to_string())
        .spawn(move || {
            for cmd in cmd_rx.iter() {
                let started = Instant::now();
                let event = run_command(api.as_ref(), cmd);
                debug!(
                    ticket = event.ticket().value(),
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "backend command finished"
                );
                if evt_tx.send(event).is_err() {
                    warn!("event receiver dropped; stopping backend worker");
                    break;
                }
            }
            info!("backend worker stopped");
        })
        .expect("failed to spawn backend worker");

    BackendHandle { cmd_tx, evt_rx }
}
