//! Snippet lifecycle controller for the VaultPaste client.
//!
//! The controller owns three independent UI state machines (tabs, custom
//! selects, and the per-page snippet flows) and drives the remote API through a
//! background worker. Hosts feed it [`app::UiEvent`]s and render its state.

/// Single-threaded controller tying the flows together.
pub mod app;
/// Backend worker + protocol types used by the controller and headless tests.
pub mod backend;
/// "Copy Link" control with timed acknowledgement.
pub mod clipboard;
/// Snippet creation flow.
pub mod create;
/// Client-side error types.
pub mod error;
/// History listing and delegated deletion.
pub mod history;
/// Host side effects (alerts, clipboard, file saves, navigation).
pub mod platform;
/// Custom single-selection dropdowns.
pub mod select;
/// Create/history tab switching.
pub mod tabs;
/// Remote API adapter.
pub mod transport;
/// Single snippet view flow.
pub mod view;

/// URL type used throughout the public API.
pub use reqwest::Url;

pub use app::{AppSettings, Page, UiEvent, VaultClientApp};
pub use backend::{spawn_backend, ApiCmd, ApiEvent, BackendHandle, RequestTicket};
pub use error::ClientError;
pub use platform::{HeadlessPlatform, Platform};
pub use transport::{ApiFailure, ApiOutcome, HttpTransport, SnippetApi};
