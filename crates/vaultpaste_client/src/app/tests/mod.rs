//! Controller tests driven through raw backend channels.
//!
//! The harness plays the worker: it reads the commands the app sends and
//! injects the events a real worker would reply with.

use super::*;
use crate::history::HistoryState;
use crate::platform::HeadlessPlatform;
use crate::transport::ApiFailure;
use chrono::{Duration as ChronoDuration, TimeZone};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use vaultpaste_core::models::{CreatedSnippet, Snippet, SnippetSummary};


struct TestHarness {
    app: VaultClientApp<HeadlessPlatform>,
    cmd_rx: Receiver<ApiCmd>,
    evt_tx: Sender<ApiEvent>,
}

fn settings() -> AppSettings {
    AppSettings {
        server: Url::parse("http://vault.test:8080").expect("server url"),
        view_path: "/view.html".to_string(),
        copy_feedback: Duration::from_millis(2_000),
    }
}

fn make_app() -> TestHarness {
    let (cmd_tx, cmd_rx) = unbounded();
    let (evt_tx, evt_rx) = unbounded();
    let app = VaultClientApp::new(
        BackendHandle::from_test_channels(cmd_tx, evt_rx),
        HeadlessPlatform::default(),
        settings(),
    );
    TestHarness {
        app,
        cmd_rx,
        evt_tx,
    }
}

impl TestHarness {
    fn home(&self) -> &HomePage {
        self.app.home().expect("home page")
    }

    fn view(&self) -> &ViewFlow {
        self.app.view().expect("view page")
    }

    fn next_cmd(&self) -> ApiCmd {
        match self.cmd_rx.try_recv() {
            Ok(cmd) => cmd,
            Err(err) => panic!("expected a backend command: {:?}", err),
        }
    }

    fn assert_no_cmd(&self) {
        assert_eq!(self.cmd_rx.try_recv(), Err(TryRecvError::Empty));
    }

    fn reply(&mut self, event: ApiEvent) {
        self.evt_tx.send(event).expect("send event");
        assert_eq!(self.app.poll_backend(), 1);
    }

    fn fill_form(&mut self, content: &str, title: &str) {
        self.app.handle(UiEvent::EditContent(content.to_string()));
        self.app.handle(UiEvent::EditTitle(title.to_string()));
    }

    /// Switch to history and answer the resulting load with `items`.
    fn open_history(&mut self, items: Vec<SnippetSummary>) {
        self.app.handle(UiEvent::SwitchTab(Tab::History));
        let ApiCmd::ListHistory { ticket } = self.next_cmd() else {
            panic!("expected history load");
        };
        self.reply(ApiEvent::HistoryListed {
            ticket,
            outcome: ApiOutcome::Ok(items),
        });
    }

    fn alerts(&self) -> Vec<String> {
        self.app.platform().alerts().to_vec()
    }
}

fn summary(id: &str, title: Option<&str>) -> SnippetSummary {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    SnippetSummary {
        id: id.to_string(),
        language: "python".to_string(),
        title: title.map(str::to_string),
        creation_date: created,
        expiry_date: created + ChronoDuration::minutes(360),
    }
}

fn snippet(id: &str, content: &str, language: &str, title: Option<&str>) -> Snippet {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    Snippet {
        id: id.to_string(),
        encrypted_content: content.to_string(),
        language: language.to_string(),
        title: title.map(str::to_string),
        creation_date: created,
        expiry_date: created + ChronoDuration::minutes(60),
    }
}

fn created(id: &str) -> ApiOutcome<CreatedSnippet> {
    ApiOutcome::Ok(CreatedSnippet { id: id.to_string() })
}

#[test]
fn starts_on_create_tab_with_default_selections() {
    let harness = make_app();
    let home = harness.home();
    assert!(home.tabs().is_active(Tab::Create));
    assert_eq!(home.selects().value(LANGUAGE_SELECT), Some("plaintext"));
    assert_eq!(home.selects().value(EXPIRY_SELECT), Some("360"));
    assert_eq!(home.history().state(), &HistoryState::Idle);
    assert!(!harness.app.has_pending_work());
    harness.assert_no_cmd();
}

#[test]
fn dropdown_events_keep_a_single_open_instance() {
    let mut harness = make_app();
    harness
        .app
        .handle(UiEvent::SelectTrigger(LANGUAGE_SELECT.to_string()));
    harness
        .app
        .handle(UiEvent::SelectTrigger(EXPIRY_SELECT.to_string()));
    assert_eq!(harness.home().selects().open_instance(), Some(EXPIRY_SELECT));

    harness.app.handle(UiEvent::SelectOption {
        select: EXPIRY_SELECT.to_string(),
        value: "1440".to_string(),
    });
    assert_eq!(harness.home().selects().open_instance(), None);
    assert_eq!(harness.home().selects().value(EXPIRY_SELECT), Some("1440"));

    harness
        .app
        .handle(UiEvent::SelectTrigger(LANGUAGE_SELECT.to_string()));
    harness.app.handle(UiEvent::ClickOutside);
    assert_eq!(harness.home().selects().open_instance(), None);
}

#[test]
fn dropped_worker_fails_requests_locally() {
    let mut harness = make_app();
    let TestHarness { app, cmd_rx, .. } = &mut harness;
    drop(std::mem::replace(cmd_rx, unbounded().1));

    app.handle(UiEvent::EditContent("body".to_string()));
    app.handle(UiEvent::SubmitCreate);
    assert_eq!(app.platform().alerts(), [create::CREATE_NETWORK_ALERT.to_string()]);
    assert!(app.home().expect("home").create().button().is_enabled());
}
