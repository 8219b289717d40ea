//! Subcommands expressed as UI event sequences against the controller.
//!
//! Each command feeds the same events a user would produce, waits (bounded)
//! for the controller to settle, and reads the resulting page state back.

use crate::host::HostLog;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use vaultpaste_client::history::{HistoryRow, HistoryState, TargetKey};
use vaultpaste_client::select::{EXPIRY_SELECT, LANGUAGE_SELECT};
use vaultpaste_client::tabs::Tab;
use vaultpaste_client::transport::ApiOutcome;
use vaultpaste_client::view::{SnippetDisplay, ViewState};
use vaultpaste_client::{HttpTransport, Platform, UiEvent, VaultClientApp};

#[derive(Debug, Error)]
pub(crate) enum CommandError {
    #[error("{0}")]
    Alert(String),
    #[error("no response from the server within {0:?}")]
    Timeout(Duration),
    #[error("'{value}' is not a valid {select} choice (expected one of: {choices})")]
    InvalidChoice {
        select: &'static str,
        value: String,
        choices: String,
    },
    #[error("server redirected to {0}; run `vpaste login` and export VAULT_SESSION first")]
    Redirected(Url),
    #[error("sign-in refused for '{0}'")]
    LoginRefused(String),
    #[error("login failed: {0}")]
    Login(String),
    #[error("Snippet not found or expired")]
    NotFound,
    #[error("{0}")]
    History(&'static str),
    #[error("'{0}' is not in your history")]
    NotInHistory(String),
    #[error("'{0}' is neither a snippet id nor a link to this server's view page")]
    InvalidTarget(String),
    #[error("download of {0} was not saved")]
    NotSaved(String),
}

/// Create-form input as typed on the command line.
#[derive(Debug, Clone, Default)]
pub(crate) struct SnippetForm {
    pub(crate) content: String,
    pub(crate) language: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) expiry: Option<String>,
}

/// Sign in and hand back the session cookie pair.
pub(crate) fn login(
    transport: &HttpTransport,
    username: &str,
    password: &str,
) -> Result<String, CommandError> {
    match transport.login(username, password) {
        ApiOutcome::Ok(cookie) => Ok(cookie),
        ApiOutcome::Failed(failure) if failure.redirected_to.is_some() => {
            Err(CommandError::LoginRefused(username.to_string()))
        }
        ApiOutcome::Failed(failure) => Err(CommandError::Login(format!(
            "server returned {}",
            failure.status
        ))),
        ApiOutcome::NetworkError(message) => Err(CommandError::Login(message)),
    }
}

fn settle<P: Platform>(app: &mut VaultClientApp<P>, wait: Duration) -> Result<(), CommandError> {
    if app.settle(wait) {
        Ok(())
    } else {
        Err(CommandError::Timeout(wait))
    }
}

/// First alert raised after the log had `seen` entries.
fn new_alert<P: HostLog>(platform: &P, seen: usize) -> Option<String> {
    platform.alert_log().get(seen).cloned()
}

fn choose<P: Platform>(
    app: &mut VaultClientApp<P>,
    select: &'static str,
    value: &str,
) -> Result<(), CommandError> {
    let Some(home) = app.home() else {
        return Ok(());
    };
    let Some(widget) = home.selects().get(select) else {
        return Ok(());
    };
    if !widget.has_option(value) {
        let choices = widget
            .options()
            .iter()
            .map(|option| option.value.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(CommandError::InvalidChoice {
            select,
            value: value.to_string(),
            choices,
        });
    }
    app.handle(UiEvent::SelectTrigger(select.to_string()));
    app.handle(UiEvent::SelectOption {
        select: select.to_string(),
        value: value.to_string(),
    });
    Ok(())
}

fn fill_form<P: Platform>(
    app: &mut VaultClientApp<P>,
    form: &SnippetForm,
) -> Result<(), CommandError> {
    if app.home().is_none() {
        app.go_home();
    }
    if let Some(language) = form.language.as_deref() {
        choose(app, LANGUAGE_SELECT, language)?;
    }
    if let Some(expiry) = form.expiry.as_deref() {
        choose(app, EXPIRY_SELECT, expiry)?;
    }
    app.handle(UiEvent::EditContent(form.content.clone()));
    app.handle(UiEvent::EditTitle(form.title.clone().unwrap_or_default()));
    Ok(())
}

/// Submit the create form and return the share link.
pub(crate) fn create_snippet<P: Platform + HostLog>(
    app: &mut VaultClientApp<P>,
    form: &SnippetForm,
    copy: bool,
    wait: Duration,
) -> Result<String, CommandError> {
    fill_form(app, form)?;
    let alerts = app.platform().alert_log().len();
    let exits = app.platform().external_log().len();

    app.handle(UiEvent::SubmitCreate);
    if let Some(alert) = new_alert(app.platform(), alerts) {
        return Err(CommandError::Alert(alert));
    }
    settle(app, wait)?;

    if let Some(alert) = new_alert(app.platform(), alerts) {
        return Err(CommandError::Alert(alert));
    }
    if let Some(target) = app.platform().external_log().get(exits) {
        return Err(CommandError::Redirected(target.clone()));
    }
    let link = app
        .home()
        .and_then(|home| home.create().share_link())
        .map(str::to_string)
        .ok_or(CommandError::Timeout(wait))?;
    if copy {
        app.handle(UiEvent::CopyLink);
    }
    Ok(link)
}

/// Interpret `target` as a full view link or a bare snippet id.
pub(crate) fn resolve_target<P: Platform>(
    app: &VaultClientApp<P>,
    target: &str,
) -> Result<Url, CommandError> {
    let trimmed = target.trim();
    let invalid = || CommandError::InvalidTarget(target.to_string());
    if trimmed.is_empty() {
        return Err(invalid());
    }
    let settings = app.settings();
    let url = match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => Url::parse(&settings.share_link(trimmed)).map_err(|_| invalid())?,
    };
    if settings.is_view_url(&url) {
        Ok(url)
    } else {
        Err(invalid())
    }
}

/// Open the view page for `target` and return what it renders.
pub(crate) fn fetch_snippet<P: Platform>(
    app: &mut VaultClientApp<P>,
    target: &str,
    wait: Duration,
) -> Result<SnippetDisplay, CommandError> {
    let url = resolve_target(app, target)?;
    debug!(url = %url, "opening view");
    app.handle(UiEvent::Navigate(url));
    settle(app, wait)?;
    match app.view().map(|view| view.state()) {
        Some(ViewState::Content(display)) => Ok(display.clone()),
        Some(ViewState::Error) => Err(CommandError::NotFound),
        Some(ViewState::Loading) | None => Err(CommandError::Timeout(wait)),
    }
}

/// Show the history tab and return its rows.
pub(crate) fn list_history<P: Platform>(
    app: &mut VaultClientApp<P>,
    wait: Duration,
) -> Result<Vec<HistoryRow>, CommandError> {
    if app.home().is_none() {
        app.go_home();
    }
    app.handle(UiEvent::SwitchTab(Tab::History));
    settle(app, wait)?;
    let state = app
        .home()
        .map(|home| home.history().state().clone())
        .unwrap_or_default();
    match state {
        HistoryState::Loaded(rows) => Ok(rows),
        HistoryState::Empty => Ok(Vec::new()),
        other => Err(CommandError::History(
            other.message().unwrap_or("History unavailable."),
        )),
    }
}

/// Delete `id` through its rendered history row.
///
/// # Returns
/// The history as re-rendered after the delete.
pub(crate) fn delete_snippet<P: Platform + HostLog>(
    app: &mut VaultClientApp<P>,
    id: &str,
    wait: Duration,
) -> Result<Vec<HistoryRow>, CommandError> {
    let rows = list_history(app, wait)?;
    if !rows.iter().any(|row| row.id == id) {
        return Err(CommandError::NotInHistory(id.to_string()));
    }
    let alerts = app.platform().alert_log().len();
    app.handle(UiEvent::HistoryClick(TargetKey::delete(id)));
    settle(app, wait)?;
    if let Some(alert) = new_alert(app.platform(), alerts) {
        return Err(CommandError::Alert(alert));
    }
    Ok(app
        .home()
        .map(|home| home.history().state().rows().to_vec())
        .unwrap_or_default())
}

fn saved_since<P: HostLog>(platform: &P, before: usize, what: &str) -> Result<PathBuf, CommandError> {
    if platform.save_count() > before {
        if let Some(path) = platform.last_saved() {
            return Ok(path);
        }
    }
    Err(CommandError::NotSaved(what.to_string()))
}

/// Fetch `target` and save it through the host.
pub(crate) fn download_snippet<P: Platform + HostLog>(
    app: &mut VaultClientApp<P>,
    target: &str,
    wait: Duration,
) -> Result<PathBuf, CommandError> {
    fetch_snippet(app, target, wait)?;
    let before = app.platform().save_count();
    app.handle(UiEvent::DownloadSnippet);
    saved_since(app.platform(), before, target)
}

/// Save the form content to history, then download it whatever the save did.
pub(crate) fn save_then_download<P: Platform + HostLog>(
    app: &mut VaultClientApp<P>,
    form: &SnippetForm,
    wait: Duration,
) -> Result<PathBuf, CommandError> {
    fill_form(app, form)?;
    let alerts = app.platform().alert_log().len();
    let before = app.platform().save_count();
    app.handle(UiEvent::DownloadRaw);
    if let Some(alert) = new_alert(app.platform(), alerts) {
        return Err(CommandError::Alert(alert));
    }
    settle(app, wait)?;
    saved_since(app.platform(), before, "form content")
}
