//! In-process mock of the VaultPaste snippet service for integration tests.
//!
//! The server runs on its own thread with a private tokio runtime so blocking
//! clients can talk to it from plain `#[test]` functions.

mod routes;
mod store;

pub use routes::MockOptions;
pub use store::{
    effective_expiry_minutes, RecordedRequest, StoredSnippet, FOREIGN_USER, SESSION_PASSWORD,
    SESSION_USER,
};

use routes::{create_router, session_pair, MockState};
use std::{
    net::SocketAddr,
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};
use store::Store;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum MockServerError {
    #[error("mock server failed to start: {0}")]
    Startup(String),
    #[error("mock server thread exited before reporting readiness")]
    Vanished,
}

/// Handle to a running mock service. Dropping it stops the server.
pub struct MockVaultServer {
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
    addr: SocketAddr,
    state: MockState,
}

impl MockVaultServer {
    /// Start a mock on an ephemeral loopback port.
    ///
    /// # Errors
    /// Returns an error if the runtime or socket cannot be created.
    pub fn start() -> Result<Self, MockServerError> {
        Self::start_with(MockOptions::default())
    }

    /// Start a mock with explicit behaviour switches.
    ///
    /// # Errors
    /// Returns an error if the runtime or socket cannot be created.
    pub fn start_with(options: MockOptions) -> Result<Self, MockServerError> {
        let state = MockState {
            store: Arc::new(Mutex::new(Store::default())),
            options,
        };
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let router = create_router(state.clone());

        let thread = thread::Builder::new()
            .name("vaultpaste-mock-server".into())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(2)
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(err) => {
                        let _ = ready_tx.send(Err(format!("failed to start runtime: {}", err)));
                        return;
                    }
                };
                let bind_addr = SocketAddr::from(([127, 0, 0, 1], 0));
                let listener = match rt.block_on(tokio::net::TcpListener::bind(bind_addr)) {
                    Ok(listener) => listener,
                    Err(err) => {
                        let _ = ready_tx.send(Err(format!("failed to bind socket: {}", err)));
                        return;
                    }
                };
                let actual_addr = listener.local_addr().unwrap_or(bind_addr);
                info!("mock vault listening on http://{}", actual_addr);
                let _ = ready_tx.send(Ok(actual_addr));

                let shutdown = async {
                    let _ = shutdown_rx.await;
                };
                let served = rt.block_on(async move {
                    axum::serve(listener, router)
                        .with_graceful_shutdown(shutdown)
                        .await
                });
                if let Err(err) = served {
                    warn!("mock server error: {}", err);
                }
            })
            .map_err(|err| MockServerError::Startup(format!("failed to spawn thread: {}", err)))?;

        let mut thread_handle = Some(thread);
        match ready_rx.recv() {
            Ok(Ok(addr)) => Ok(Self {
                shutdown: Some(shutdown_tx),
                thread: thread_handle.take(),
                addr,
                state,
            }),
            Ok(Err(message)) => {
                let _ = shutdown_tx.send(());
                if let Some(handle) = thread_handle.take() {
                    let _ = handle.join();
                }
                Err(MockServerError::Startup(message))
            }
            Err(_) => {
                let _ = shutdown_tx.send(());
                if let Some(handle) = thread_handle.take() {
                    let _ = handle.join();
                }
                Err(MockServerError::Vanished)
            }
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:41234`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Cookie pair (`NAME=value`) that signs a client in as [`SESSION_USER`].
    pub fn session_cookie(&self) -> String {
        session_pair()
    }

    /// Insert a snippet owned by the session user, bypassing HTTP.
    pub fn seed(&self, content: &str, language: &str, title: Option<&str>) -> StoredSnippet {
        self.state
            .lock()
            .insert(content, language, title, None, Some(SESSION_USER))
    }

    /// Insert a snippet the session user does not own.
    pub fn seed_foreign(&self, content: &str, language: &str) -> StoredSnippet {
        self.state
            .lock()
            .insert(content, language, None, None, Some(FOREIGN_USER))
    }

    /// Delete `id` behind the client's back.
    pub fn remove(&self, id: &str) -> bool {
        self.state.lock().remove(id)
    }

    /// Push `id` past its expiry.
    pub fn expire(&self, id: &str) -> bool {
        self.state.lock().expire(id)
    }

    /// Every stored id, expired or not.
    pub fn snippet_ids(&self) -> Vec<String> {
        self.state.lock().ids()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests()
    }

    /// Requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path.starts_with(prefix))
            .collect()
    }
}

impl Drop for MockVaultServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
