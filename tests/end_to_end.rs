//! Whole-client scenarios: controller, worker thread, HTTP transport, and the
//! in-process mock service.

use std::net::TcpListener;
use std::time::Duration;
use tempfile::TempDir;
use vaultpaste::create::SubmitButton;
use vaultpaste::history::{
    HistoryState, TargetKey, EMPTY_MESSAGE, FAILED_MESSAGE, LOADING_MESSAGE,
    NETWORK_ERROR_MESSAGE,
};
use vaultpaste::models::LanguageIcon;
use vaultpaste::select::LANGUAGE_SELECT;
use vaultpaste::tabs::Tab;
use vaultpaste::view::ViewState;
use vaultpaste::{connect, Config, HeadlessPlatform, UiEvent, Url, VaultClientApp};
use vaultpaste_testkit::{MockOptions, MockVaultServer};

const SETTLE: Duration = Duration::from_secs(5);

struct Client {
    app: VaultClientApp<HeadlessPlatform>,
    _dir: TempDir,
}

fn client_for(server: &MockVaultServer) -> Client {
    client_with_session(&server.base_url(), Some(server.session_cookie()))
}

fn client_with_session(server_url: &str, session: Option<String>) -> Client {
    let dir = TempDir::new().expect("temp dir");
    let config = Config {
        server_url: server_url.to_string(),
        view_path: "/view.html".to_string(),
        request_timeout_secs: 3,
        copy_feedback_ms: 2_000,
        prefs_path: dir.path().join("prefs.json").to_string_lossy().to_string(),
        download_dir: dir.path().to_string_lossy().to_string(),
        http_log: false,
        session,
    };
    let app = connect(&config, HeadlessPlatform::default()).expect("connect");
    Client { app, _dir: dir }
}

fn parse_link(link: &str) -> Url {
    Url::parse(link).expect("link parses")
}

fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    format!("http://{}", listener.local_addr().expect("addr"))
}

impl Client {
    fn settle(&mut self) {
        assert!(self.app.settle(SETTLE), "client did not settle");
    }

    fn history_state(&self) -> HistoryState {
        self.app
            .home()
            .expect("home page")
            .history()
            .state()
            .clone()
    }

    fn open_history(&mut self) {
        self.app.handle(UiEvent::SwitchTab(Tab::History));
        self.settle();
    }
}

#[test]
fn created_snippet_opens_in_view_with_submitted_content() {
    let server = MockVaultServer::start().expect("server");
    let mut client = client_for(&server);

    client.app.handle(UiEvent::SelectTrigger(LANGUAGE_SELECT.to_string()));
    client.app.handle(UiEvent::SelectOption {
        select: LANGUAGE_SELECT.to_string(),
        value: "python".to_string(),
    });
    client.app.handle(UiEvent::EditContent("print('hi')".to_string()));
    client.app.handle(UiEvent::EditTitle("demo".to_string()));
    client.app.handle(UiEvent::SubmitCreate);
    client.app.handle(UiEvent::SubmitCreate);
    client.settle();

    let home = client.app.home().expect("home page");
    assert_eq!(home.create().button(), SubmitButton::Created);
    let link = home.create().share_link().expect("share link").to_string();
    assert_eq!(server.requests_to("/api/snippets").len(), 1);

    let url = parse_link(&link);
    client.app.handle(UiEvent::Navigate(url));
    client.settle();

    match client.app.view().expect("view page").state() {
        ViewState::Content(display) => {
            assert_eq!(display.code, "print('hi')");
            assert_eq!(display.badge, "Python");
            assert_eq!(display.title.as_deref(), Some("demo"));
        }
        other => panic!("expected content, got {:?}", other),
    }
}

#[test]
fn unknown_language_renders_generic_icon_and_raw_badge() {
    let server = MockVaultServer::start().expect("server");
    let seeded = server.seed("qapla'", "klingon", None);
    let mut client = client_for(&server);

    let link = client.app.settings().share_link(&seeded.id);
    client.app.handle(UiEvent::Navigate(parse_link(&link)));
    client.settle();

    match client.app.view().expect("view page").state() {
        ViewState::Content(display) => {
            assert_eq!(display.icon, LanguageIcon::Generic);
            assert_eq!(display.badge, "klingon");
            assert!(display.title.is_none());
        }
        other => panic!("expected content, got {:?}", other),
    }
}

#[test]
fn missing_or_absent_ids_end_in_error() {
    let server = MockVaultServer::start().expect("server");
    let mut client = client_for(&server);

    let missing = client.app.settings().share_link("does-not-exist");
    client.app.handle(UiEvent::Navigate(parse_link(&missing)));
    client.settle();
    assert_eq!(client.app.view().expect("view").state(), &ViewState::Error);
    assert!(!client.app.view().expect("view").can_download());

    let before = server.requests().len();
    let bare = format!("{}/view.html", server.base_url());
    client.app.handle(UiEvent::Navigate(parse_link(&bare)));
    assert_eq!(client.app.view().expect("view").state(), &ViewState::Error);
    assert_eq!(server.requests().len(), before);
}

#[test]
fn history_placeholders_are_pairwise_distinct() {
    let messages = [
        LOADING_MESSAGE,
        EMPTY_MESSAGE,
        FAILED_MESSAGE,
        NETWORK_ERROR_MESSAGE,
    ];
    for (i, a) in messages.iter().enumerate() {
        for b in &messages[i + 1..] {
            assert_ne!(a, b);
        }
    }

    let server = MockVaultServer::start().expect("server");
    let mut empty = client_for(&server);
    empty.open_history();
    assert_eq!(empty.history_state().message(), Some(EMPTY_MESSAGE));

    let failing = MockVaultServer::start_with(MockOptions {
        history_status: Some(500),
        ..MockOptions::default()
    })
    .expect("server");
    let mut failed = client_for(&failing);
    failed.open_history();
    assert_eq!(failed.history_state().message(), Some(FAILED_MESSAGE));

    let mut offline = client_with_session(&unused_base_url(), None);
    offline.open_history();
    assert_eq!(offline.history_state().message(), Some(NETWORK_ERROR_MESSAGE));
}

#[test]
fn successful_delete_reloads_without_the_row() {
    let server = MockVaultServer::start().expect("server");
    let keep = server.seed("keep", "java", Some("keep"));
    let gone = server.seed("gone", "python", Some("gone"));
    let mut client = client_for(&server);
    client.open_history();
    assert_eq!(client.history_state().rows().len(), 2);

    client
        .app
        .handle(UiEvent::HistoryClick(TargetKey::delete(gone.id.clone())));
    client.settle();

    let ids: Vec<String> = client
        .history_state()
        .rows()
        .iter()
        .map(|row| row.id.clone())
        .collect();
    assert_eq!(ids, vec![keep.id]);
    assert_eq!(server.requests_to("/api/snippets/history").len(), 2);
}

#[test]
fn delete_of_vanished_id_alerts_and_keeps_the_list() {
    let server = MockVaultServer::start().expect("server");
    let ghost = server.seed("ghost", "java", None);
    let mut client = client_for(&server);
    client.open_history();
    let before = client.history_state();
    assert!(server.remove(&ghost.id));

    client
        .app
        .handle(UiEvent::HistoryClick(TargetKey::delete(ghost.id.clone())));
    client.settle();

    assert_eq!(
        client.app.platform().alerts(),
        ["Failed to delete. Server returned: 403".to_string()]
    );
    assert_eq!(client.history_state(), before);
    assert_eq!(server.requests_to("/api/snippets/history").len(), 1);
}

#[test]
fn anonymous_create_leaves_for_login_page() {
    let server = MockVaultServer::start().expect("server");
    let mut client = client_with_session(&server.base_url(), None);
    client.app.handle(UiEvent::EditContent("secret".to_string()));
    client.app.handle(UiEvent::SubmitCreate);
    client.settle();

    let opened = client.app.platform().opened();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].path(), "/index.html");
    assert_eq!(
        client.app.home().expect("home").create().button(),
        SubmitButton::Busy
    );
    assert!(client.app.platform().alerts().is_empty());
}

#[test]
fn raw_download_saves_to_history_and_writes_file() {
    let server = MockVaultServer::start().expect("server");
    let mut client = client_for(&server);
    client.app.handle(UiEvent::EditContent("<p>x</p>".to_string()));
    client.app.handle(UiEvent::EditTitle("page".to_string()));
    client.app.handle(UiEvent::DownloadRaw);
    client.settle();

    assert_eq!(server.snippet_ids().len(), 1);
    let saved = client.app.platform().saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].filename, "page.txt");
    assert_eq!(saved[0].bytes, b"<p>x</p>");
    assert!(server.requests_to("/api/snippets/history").is_empty());
}
