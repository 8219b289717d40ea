//! Root crate facade for the VaultPaste client.

use std::sync::Arc;
use tracing::info;

pub use vaultpaste_client::{
    app, backend, clipboard, create, history, platform, select, tabs, transport, view,
    spawn_backend, ApiCmd, ApiEvent, ApiFailure, ApiOutcome, AppSettings, BackendHandle,
    ClientError, HeadlessPlatform, HttpTransport, Page, Platform, RequestTicket, SnippetApi,
    UiEvent, Url, VaultClientApp,
};
pub use vaultpaste_core::{config, download, env, models, theme, AppError, Config};

/// Wire a controller to the configured server through a background worker.
///
/// # Arguments
/// - `config`: Resolved runtime configuration.
/// - `platform`: Host that performs alerts, clipboard writes, and saves.
///
/// # Errors
/// Returns [`ClientError::InvalidServerUrl`] or an HTTP client construction
/// error when the server URL is unusable.
pub fn connect<P: Platform>(config: &Config, platform: P) -> Result<VaultClientApp<P>, ClientError> {
    let settings = AppSettings::from_config(config)?;
    let transport = HttpTransport::from_config(config)?;
    info!(server = %transport.base_url(), "connecting client");
    Ok(VaultClientApp::new(
        spawn_backend(Arc::new(transport)),
        platform,
        settings,
    ))
}
