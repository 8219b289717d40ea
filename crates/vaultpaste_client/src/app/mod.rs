//! Single-threaded controller tying the flows together.
//!
//! `VaultClientApp` owns every piece of page state. Hosts call [`VaultClientApp::handle`]
//! for user actions, [`VaultClientApp::poll_backend`] each frame (or loop), and
//! [`VaultClientApp::tick`] to expire timed labels. Network work happens on the
//! backend worker; completions come back as tickets and are applied here only
//! if the flow that issued them is still the one on screen.

use crate::backend::{ApiCmd, ApiEvent, BackendHandle, RequestTicket, TicketCounter};
use crate::create::{self, CreateCompletion, CreateFlow, SubmitDecision};
use crate::error::ClientError;
use crate::history::{DeleteCompletion, HistoryList, RowAction, TargetKey};
use crate::platform::Platform;
use crate::select::{SelectGroup, EXPIRY_SELECT, LANGUAGE_SELECT};
use crate::tabs::{Tab, TabController, TabSwitch};
use crate::transport::{parse_server_url, ApiOutcome};
use crate::view::ViewFlow;
use chrono::Utc;
use crossbeam_channel::RecvTimeoutError;
use reqwest::Url;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use vaultpaste_core::config::normalize_view_path;
use vaultpaste_core::download::{prepare_download, FileDownload};
use vaultpaste_core::models::CreateSnippetRequest;
use vaultpaste_core::Config;

/// Where the client lives and how it renders feedback.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub server: Url,
    pub view_path: String,
    pub copy_feedback: Duration,
}

impl AppSettings {
    /// Build settings from the resolved runtime configuration.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidServerUrl`] when the configured server is
    /// not an http(s) URL.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Ok(Self {
            server: parse_server_url(&config.server_url)?,
            view_path: normalize_view_path(&config.view_path),
            copy_feedback: config.copy_feedback(),
        })
    }

    /// Share link for `id`.
    pub fn share_link(&self, id: &str) -> String {
        create::share_link(&self.server, &self.view_path, id)
    }

    /// Whether `url` addresses this client's view page.
    pub fn is_view_url(&self, url: &Url) -> bool {
        url.origin() == self.server.origin() && url.path() == self.view_path
    }
}

/// User actions a host can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SwitchTab(Tab),
    SelectTrigger(String),
    SelectOption { select: String, value: String },
    /// A click that landed outside every dropdown.
    ClickOutside,
    EditContent(String),
    EditTitle(String),
    SubmitCreate,
    /// Save the form content to history, then download it.
    DownloadRaw,
    CopyLink,
    HistoryClick(TargetKey),
    Navigate(Url),
    /// Download the snippet shown on the view page.
    DownloadSnippet,
}

/// State of the tabbed home page.
#[derive(Debug)]
pub struct HomePage {
    tabs: TabController,
    selects: SelectGroup,
    create: CreateFlow,
    history: HistoryList,
}

impl HomePage {
    fn new(copy_feedback: Duration) -> Self {
        Self {
            tabs: TabController::default(),
            selects: SelectGroup::create_form(),
            create: CreateFlow::new(copy_feedback),
            history: HistoryList::default(),
        }
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn selects(&self) -> &SelectGroup {
        &self.selects
    }

    pub fn create(&self) -> &CreateFlow {
        &self.create
    }

    pub fn history(&self) -> &HistoryList {
        &self.history
    }

    fn language(&self) -> &str {
        self.selects.value(LANGUAGE_SELECT).unwrap_or_default()
    }

    fn expiry(&self) -> &str {
        self.selects.value(EXPIRY_SELECT).unwrap_or_default()
    }
}

/// The page currently on screen. Leaving a page discards its state.
#[derive(Debug)]
pub enum Page {
    Home(HomePage),
    View(ViewFlow),
}

pub struct VaultClientApp<P: Platform> {
    backend: BackendHandle,
    platform: P,
    settings: AppSettings,
    tickets: TicketCounter,
    page: Page,
    pending_downloads: HashMap<RequestTicket, FileDownload>,
}

impl<P: Platform> VaultClientApp<P> {
    pub fn new(backend: BackendHandle, platform: P, settings: AppSettings) -> Self {
        let page = Page::Home(HomePage::new(settings.copy_feedback));
        Self {
            backend,
            platform,
            settings,
            tickets: TicketCounter::default(),
            page,
            pending_downloads: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn home(&self) -> Option<&HomePage> {
        match &self.page {
            Page::Home(home) => Some(home),
            Page::View(_) => None,
        }
    }

    pub fn view(&self) -> Option<&ViewFlow> {
        match &self.page {
            Page::View(view) => Some(view),
            Page::Home(_) => None,
        }
    }

    /// Whether any request issued by this app is still unanswered.
    pub fn has_pending_work(&self) -> bool {
        if !self.pending_downloads.is_empty() {
            return true;
        }
        match &self.page {
            Page::Home(home) => {
                home.create.is_pending()
                    || home.history.is_loading()
                    || home.history.has_pending_deletes()
            }
            Page::View(view) => view.pending_fetch().is_some(),
        }
    }

    /// Replace the current page with a fresh home page.
    pub fn go_home(&mut self) {
        self.page = Page::Home(HomePage::new(self.settings.copy_feedback));
    }

    /// Replace the current page with the view page for `url` and start its fetch.
    pub fn open_view(&mut self, url: &Url) {
        let ticket = self.tickets.issue();
        let view = ViewFlow::open(url, ticket);
        let fetch = view
            .pending_fetch()
            .map(|(ticket, id)| ApiCmd::FetchSnippet {
                ticket,
                id: id.to_string(),
            });
        self.page = Page::View(view);
        if let Some(cmd) = fetch {
            self.dispatch(cmd);
        }
    }

    /// Follow `url`: the view page opens in-app, anything else leaves.
    pub fn navigate(&mut self, url: &Url) {
        if self.settings.is_view_url(url) {
            self.open_view(url);
        } else {
            info!(url = %url, "leaving client");
            self.platform.open_external(url);
        }
    }

    /// Apply one user action.
    pub fn handle(&mut self, event: UiEvent) {
        let now = Instant::now();
        if let UiEvent::Navigate(url) = &event {
            self.navigate(url);
            return;
        }
        if let UiEvent::DownloadSnippet = &event {
            self.download_snippet();
            return;
        }
        let Page::Home(home) = &mut self.page else {
            debug!(?event, "event has no target on the view page");
            return;
        };
        match event {
            UiEvent::SwitchTab(tab) => {
                if home.tabs.switch(tab) == TabSwitch::LoadHistory {
                    self.load_history();
                }
            }
            UiEvent::SelectTrigger(name) => {
                home.selects.click_trigger(&name);
            }
            UiEvent::SelectOption { select, value } => {
                home.selects.click_option(&select, &value);
            }
            UiEvent::ClickOutside => home.selects.click_outside(),
            UiEvent::EditContent(content) => home.create.content = content,
            UiEvent::EditTitle(title) => home.create.title = title,
            UiEvent::SubmitCreate => self.submit_create(),
            UiEvent::DownloadRaw => self.download_raw(),
            UiEvent::CopyLink => {
                let link = home.create.share_link().unwrap_or_default().to_string();
                home.create
                    .copy_button_mut()
                    .copy(&mut self.platform, &link, now);
            }
            UiEvent::HistoryClick(target) => match home.history.click(&target) {
                Some(RowAction::Open(id)) => match Url::parse(&self.settings.share_link(&id)) {
                    Ok(url) => self.open_view(&url),
                    Err(err) => warn!(id = %id, "cannot build view link: {}", err),
                },
                Some(RowAction::Delete(id)) => {
                    let ticket = self.tickets.issue();
                    if home.history.begin_delete(ticket, &id) {
                        self.dispatch(ApiCmd::DeleteSnippet { ticket, id });
                    }
                }
                None => debug!(?target, "click outside any row target"),
            },
            UiEvent::Navigate(_) | UiEvent::DownloadSnippet => {}
        }
    }

    fn submit_create(&mut self) {
        let Page::Home(home) = &mut self.page else {
            return;
        };
        let ticket = self.tickets.issue();
        let language = home.language().to_string();
        let expiry = home.expiry().to_string();
        match home.create.submit(&language, &expiry, ticket) {
            SubmitDecision::Send(request) => {
                self.dispatch(ApiCmd::CreateSnippet { ticket, request });
            }
            SubmitDecision::Rejected(alert) => self.platform.alert(alert),
            SubmitDecision::Ignored => debug!("submit ignored while disabled"),
        }
    }

    fn download_raw(&mut self) {
        let Page::Home(home) = &self.page else {
            return;
        };
        if home.create.content.is_empty() {
            self.platform.alert(create::EMPTY_DOWNLOAD_ALERT);
            return;
        }
        let request = CreateSnippetRequest::from_form(
            &home.create.content,
            home.language(),
            &home.create.title,
            home.expiry(),
        );
        let download = prepare_download(
            &request.content,
            &request.language,
            request.title.as_deref(),
            Utc::now(),
        );
        let ticket = self.tickets.issue();
        self.pending_downloads.insert(ticket, download);
        self.dispatch(ApiCmd::SaveForDownload { ticket, request });
    }

    fn download_snippet(&mut self) {
        let Page::View(view) = &self.page else {
            return;
        };
        if let Some(download) = view.download(Utc::now()) {
            self.save(download);
        }
    }

    fn save(&mut self, download: FileDownload) {
        let filename = download.filename.clone();
        match self.platform.save_file(download) {
            Ok(()) => info!(file = %filename, "download saved"),
            Err(err) => warn!(file = %filename, "download failed: {}", err),
        }
    }

    fn load_history(&mut self) {
        let Page::Home(home) = &mut self.page else {
            return;
        };
        let ticket = self.tickets.issue();
        home.history.begin_load(ticket);
        self.dispatch(ApiCmd::ListHistory { ticket });
    }

    fn history_tab_active(&self) -> bool {
        matches!(&self.page, Page::Home(home) if home.tabs.is_active(Tab::History))
    }

    fn dispatch(&mut self, cmd: ApiCmd) {
        if let Err(err) = self.backend.cmd_tx.send(cmd) {
            error!("backend worker unavailable; failing request locally");
            self.apply_event(offline_event(err.into_inner()));
        }
    }

    /// Drain every completion that is ready.
    ///
    /// # Returns
    /// Number of events applied.
    pub fn poll_backend(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.backend.evt_rx.try_recv() {
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for one completion, then drain the rest.
    ///
    /// # Returns
    /// Number of events applied; `0` on timeout.
    pub fn poll_backend_blocking(&mut self, timeout: Duration) -> usize {
        match self.backend.evt_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.apply_event(event);
                1 + self.poll_backend()
            }
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => {
                error!("backend worker disconnected");
                0
            }
        }
    }

    /// Poll until no request is outstanding or `timeout` elapses.
    ///
    /// # Returns
    /// `true` when everything settled in time.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.has_pending_work() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if self.poll_backend_blocking(remaining) == 0 {
                return !self.has_pending_work();
            }
        }
        true
    }

    /// Expire timed labels.
    pub fn tick(&mut self, now: Instant) {
        if let Page::Home(home) = &mut self.page {
            home.create.copy_button_mut().tick(now);
        }
    }

    fn apply_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::SnippetCreated { ticket, outcome } => {
                let Page::Home(home) = &mut self.page else {
                    debug!(ticket = ticket.value(), "create finished after page change");
                    return;
                };
                match home.create.complete(
                    ticket,
                    outcome,
                    &self.settings.server,
                    &self.settings.view_path,
                ) {
                    CreateCompletion::Created { .. } | CreateCompletion::Stale => {}
                    CreateCompletion::Navigate(url) => self.navigate(&url),
                    CreateCompletion::Alert(alert) => self.platform.alert(alert),
                }
            }
            ApiEvent::SnippetFetched { ticket, outcome } => {
                let applied = match &mut self.page {
                    Page::View(view) => view.complete(ticket, outcome),
                    Page::Home(_) => false,
                };
                if !applied {
                    debug!(ticket = ticket.value(), "dropping stale snippet fetch");
                }
            }
            ApiEvent::HistoryListed { ticket, outcome } => {
                let tab_active = self.history_tab_active();
                if let Page::Home(home) = &mut self.page {
                    home.history.complete_load(ticket, outcome, tab_active);
                }
            }
            ApiEvent::SnippetDeleted {
                ticket,
                id,
                outcome,
            } => {
                let Page::Home(home) = &mut self.page else {
                    return;
                };
                match home.history.complete_delete(ticket, &id, outcome) {
                    DeleteCompletion::Reload => {
                        if self.history_tab_active() {
                            self.load_history();
                        }
                    }
                    DeleteCompletion::Alert(alert) => self.platform.alert(&alert),
                    DeleteCompletion::Stale => {}
                }
            }
            ApiEvent::SavedForDownload { ticket, outcome } => {
                let Some(download) = self.pending_downloads.remove(&ticket) else {
                    return;
                };
                let saved = match &outcome {
                    ApiOutcome::Ok(created) => {
                        info!(id = %created.id, "content saved to history before download");
                        true
                    }
                    ApiOutcome::Failed(failure) => {
                        warn!(status = failure.status, "save to history failed; downloading anyway");
                        false
                    }
                    ApiOutcome::NetworkError(message) => {
                        warn!("save to history failed: {}; downloading anyway", message);
                        false
                    }
                };
                if saved && self.history_tab_active() {
                    self.load_history();
                }
                self.save(download);
            }
        }
    }
}

/// Completion for a command the worker never received.
fn offline_event(cmd: ApiCmd) -> ApiEvent {
    let message = || "backend worker unavailable".to_string();
    match cmd {
        ApiCmd::CreateSnippet { ticket, .. } => ApiEvent::SnippetCreated {
            ticket,
            outcome: ApiOutcome::NetworkError(message()),
        },
        ApiCmd::FetchSnippet { ticket, .. } => ApiEvent::SnippetFetched {
            ticket,
            outcome: ApiOutcome::NetworkError(message()),
        },
        ApiCmd::ListHistory { ticket } => ApiEvent::HistoryListed {
            ticket,
            outcome: ApiOutcome::NetworkError(message()),
        },
        ApiCmd::DeleteSnippet { ticket, id } => ApiEvent::SnippetDeleted {
            ticket,
            id,
            outcome: ApiOutcome::NetworkError(message()),
        },
        ApiCmd::SaveForDownload { ticket, .. } => ApiEvent::SavedForDownload {
            ticket,
            outcome: ApiOutcome::NetworkError(message()),
        },
    }
}

#[cfg(test)]
mod tests;
