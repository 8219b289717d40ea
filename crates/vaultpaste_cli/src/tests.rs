//! Unit tests for the `vpaste` entrypoint and its commands.

use super::commands::{self, CommandError, SnippetForm};
use super::host::HostLog;
use super::{
    execute, explicit_server_override, format_created, format_history, format_session,
    resolve_config,
    run_and_report, Cli, Commands,
};
use clap::Parser;
use reqwest::Url;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use vaultpaste_client::history::{HistoryRow, EMPTY_MESSAGE};
use vaultpaste_client::{spawn_backend, AppSettings, HeadlessPlatform, HttpTransport, VaultClientApp};
use vaultpaste_core::env::{env_lock, EnvGuard};
use vaultpaste_core::DEFAULT_SERVER_URL;
use vaultpaste_testkit::{MockOptions, MockVaultServer, SESSION_PASSWORD, SESSION_USER};

const WAIT: Duration = Duration::from_secs(5);

fn app_for(server: &MockVaultServer) -> VaultClientApp<HeadlessPlatform> {
    app_with_session(&server.base_url(), Some(&server.session_cookie()))
}

fn app_with_session(base_url: &str, session: Option<&str>) -> VaultClientApp<HeadlessPlatform> {
    let transport = HttpTransport::new(base_url, Duration::from_secs(3)).expect("transport");
    if let Some(session) = session {
        transport.set_session(session);
    }
    let settings = AppSettings {
        server: Url::parse(base_url).expect("server url"),
        view_path: "/view.html".to_string(),
        copy_feedback: Duration::from_millis(50),
    };
    VaultClientApp::new(
        spawn_backend(Arc::new(transport)),
        HeadlessPlatform::default(),
        settings,
    )
}

fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    format!("http://{}", listener.local_addr().expect("addr"))
}

fn form(content: &str, language: Option<&str>, title: Option<&str>) -> SnippetForm {
    SnippetForm {
        content: content.to_string(),
        language: language.map(str::to_string),
        title: title.map(str::to_string),
        expiry: None,
    }
}

#[test]
fn run_and_report_maps_results_to_exit_codes() {
    assert_eq!(run_and_report(|| Ok::<(), &str>(())), 0);
    assert_eq!(run_and_report(|| Err::<(), &str>("boom")), 1);
}

#[test]
fn cli_parses_new_with_form_options() {
    let cli = Cli::try_parse_from([
        "vpaste", "new", "--language", "python", "--title", "demo", "--expiry", "60", "--copy",
    ])
    .expect("cli should parse new");
    match cli.command {
        Commands::New {
            file,
            language,
            title,
            expiry,
            copy,
        } => {
            assert!(file.is_none());
            assert_eq!(language.as_deref(), Some("python"));
            assert_eq!(title.as_deref(), Some("demo"));
            assert_eq!(expiry.as_deref(), Some("60"));
            assert!(copy);
        }
        _ => panic!("expected new command"),
    }
}

#[test]
fn cli_accepts_global_json_after_subcommand() {
    let cli = Cli::try_parse_from(["vpaste", "download", "abc", "--out", "x.txt", "--json"])
        .expect("cli should parse download");
    assert!(cli.json);
    match cli.command {
        Commands::Download { target, out } => {
            assert_eq!(target, "abc");
            assert_eq!(out.as_deref(), Some(std::path::Path::new("x.txt")));
        }
        _ => panic!("expected download command"),
    }
}

#[test]
fn blank_server_override_is_absent() {
    assert_eq!(explicit_server_override(Some("   ".to_string())), None);
    assert_eq!(
        explicit_server_override(Some(" http://10.0.0.1:8080 ".to_string())),
        Some("http://10.0.0.1:8080".to_string())
    );
}

#[test]
fn explicit_server_beats_environment_and_zero_timeout_is_ignored() {
    let _lock = env_lock().lock().expect("env lock");
    let _server = EnvGuard::set("VAULT_SERVER", "http://10.1.1.1:9000");
    let _timeout = EnvGuard::set("VAULT_TIMEOUT_SECS", "12");

    let config = resolve_config(None, Some(0));
    assert_eq!(config.server_url, "http://10.1.1.1:9000");
    assert_eq!(config.request_timeout_secs, 12);

    let config = resolve_config(Some("http://127.0.0.1:7000".to_string()), Some(3));
    assert_eq!(config.server_url, "http://127.0.0.1:7000");
    assert_eq!(config.request_timeout_secs, 3);
}

#[test]
fn vault_server_env_reaches_the_server_flag() {
    let _lock = env_lock().lock().expect("env lock");
    let _server = EnvGuard::set("VAULT_SERVER", "http://127.0.0.1:47777");
    let cli = Cli::parse_from(["vpaste", "history"]);
    assert_eq!(cli.server.as_deref(), Some("http://127.0.0.1:47777"));

    let _removed = EnvGuard::remove("VAULT_SERVER");
    let cli = Cli::parse_from(["vpaste", "history"]);
    assert_eq!(resolve_config(cli.server, None).server_url, DEFAULT_SERVER_URL);
}

#[test]
fn output_helpers_render_text_and_json() {
    assert_eq!(
        format_created("http://h/view.html?id=1", false).expect("text"),
        "Created: http://h/view.html?id=1"
    );
    let rendered = format_created("http://h/view.html?id=1", true).expect("json");
    let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
    assert_eq!(parsed["link"], "http://h/view.html?id=1");

    assert_eq!(format_history(&[], false).expect("text"), EMPTY_MESSAGE);
    let rows = vec![HistoryRow {
        id: "abc".to_string(),
        title: "demo".to_string(),
        language: "python".to_string(),
        created: "1/1/2025, 10:00:00 AM".to_string(),
        expires: "1/1/2025, 4:00:00 PM".to_string(),
    }];
    let rendered = format_history(&rows, true).expect("json");
    let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
    assert_eq!(parsed[0]["id"], "abc");
    assert_eq!(parsed[0]["title"], "demo");
}

#[test]
fn new_returns_share_link_and_copies_it() {
    let server = MockVaultServer::start().expect("server");
    let mut app = app_for(&server);

    let link = commands::create_snippet(
        &mut app,
        &form("print('hi')", Some("python"), Some("demo")),
        true,
        WAIT,
    )
    .expect("create");

    let url = Url::parse(&link).expect("link");
    assert_eq!(url.path(), "/view.html");
    let id = url
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .expect("id param");
    assert_eq!(server.snippet_ids(), vec![id]);
    assert_eq!(app.platform().clipboard(), Some(link.as_str()));
}

#[test]
fn unknown_language_is_rejected_before_any_request() {
    let server = MockVaultServer::start().expect("server");
    let mut app = app_for(&server);

    let err = commands::create_snippet(&mut app, &form("x", Some("cobol"), None), false, WAIT)
        .expect_err("cobol is not offered");
    match err {
        CommandError::InvalidChoice { select, value, choices } => {
            assert_eq!(select, "language");
            assert_eq!(value, "cobol");
            assert!(choices.contains("python"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(server.requests().is_empty());
}

#[test]
fn empty_content_surfaces_the_form_alert() {
    let server = MockVaultServer::start().expect("server");
    let mut app = app_for(&server);
    let err = commands::create_snippet(&mut app, &form("", None, None), false, WAIT)
        .expect_err("empty content");
    assert_eq!(err.to_string(), "Content cannot be empty");
    assert!(server.requests().is_empty());
}

#[test]
fn anonymous_create_reports_the_login_redirect() {
    let server = MockVaultServer::start().expect("server");
    let mut app = app_with_session(&server.base_url(), None);
    let err = commands::create_snippet(&mut app, &form("body", None, None), false, WAIT)
        .expect_err("redirect");
    match err {
        CommandError::Redirected(target) => assert_eq!(target.path(), "/index.html"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn get_accepts_ids_and_share_links() {
    let server = MockVaultServer::start().expect("server");
    let seeded = server.seed("<b>hi</b>", "html", Some("markup"));
    let mut app = app_for(&server);

    let by_id = commands::fetch_snippet(&mut app, &seeded.id, WAIT).expect("by id");
    assert_eq!(by_id.code, "<b>hi</b>");
    assert_eq!(by_id.title.as_deref(), Some("markup"));

    let link = app.settings().share_link(&seeded.id);
    let by_link = commands::fetch_snippet(&mut app, &link, WAIT).expect("by link");
    assert_eq!(by_link, by_id);
}

#[test]
fn get_of_missing_snippet_is_not_found() {
    let server = MockVaultServer::start().expect("server");
    let mut app = app_for(&server);
    let err = commands::fetch_snippet(&mut app, "nope", WAIT).expect_err("missing");
    assert!(matches!(err, CommandError::NotFound));
}

#[test]
fn links_to_other_pages_are_not_snippet_targets() {
    let server = MockVaultServer::start().expect("server");
    let app = app_for(&server);
    let foreign = format!("{}/index.html?id=abc", server.base_url());
    for target in ["", "   ", foreign.as_str(), "https://example.com/view.html?id=abc"] {
        assert!(
            matches!(
                commands::resolve_target(&app, target),
                Err(CommandError::InvalidTarget(_))
            ),
            "target: {:?}",
            target
        );
    }
}

#[test]
fn history_and_delete_go_through_rendered_rows() {
    let server = MockVaultServer::start().expect("server");
    let keep = server.seed("keep", "java", Some("keep me"));
    let drop = server.seed("drop", "python", None);
    let foreign = server.seed_foreign("theirs", "java");
    let mut app = app_for(&server);

    let rows = commands::list_history(&mut app, WAIT).expect("history");
    assert_eq!(rows.len(), 2);

    let err = commands::delete_snippet(&mut app, &foreign.id, WAIT).expect_err("not listed");
    assert!(matches!(err, CommandError::NotInHistory(_)));
    assert!(server.requests_to("/api/snippets/").iter().all(|r| r.method != "DELETE"));

    let remaining = commands::delete_snippet(&mut app, &drop.id, WAIT).expect("delete");
    let ids: Vec<&str> = remaining.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, [keep.id.as_str()]);
    assert!(!server.snippet_ids().contains(&drop.id));
}

#[test]
fn history_failure_is_reported_with_its_message() {
    let server = MockVaultServer::start_with(MockOptions {
        history_status: Some(500),
        ..MockOptions::default()
    })
    .expect("server");
    let mut app = app_for(&server);
    let err = commands::list_history(&mut app, WAIT).expect_err("failure");
    assert_eq!(err.to_string(), "Failed to load history.");
}

#[test]
fn download_saves_fetched_snippet_under_derived_name() {
    let server = MockVaultServer::start().expect("server");
    let seeded = server.seed("print('hi')", "python", Some("demo"));
    let mut app = app_for(&server);

    let path = commands::download_snippet(&mut app, &seeded.id, WAIT).expect("download");
    assert_eq!(path, std::path::PathBuf::from("demo.py"));
    let saved = &app.platform().saved()[0];
    assert_eq!(saved.bytes, b"print('hi')");
}

#[test]
fn save_download_writes_file_even_when_server_is_down() {
    let mut app = app_with_session(&unused_base_url(), None);
    let path = commands::save_then_download(
        &mut app,
        &form("notes", Some("plaintext"), Some("notes")),
        WAIT,
    )
    .expect("download despite network error");
    assert_eq!(path, std::path::PathBuf::from("notes.txt"));
    assert!(app.platform().alert_log().is_empty());
}

#[test]
fn save_download_stores_content_in_history_first() {
    let server = MockVaultServer::start().expect("server");
    let mut app = app_for(&server);
    let path = commands::save_then_download(&mut app, &form("class A {}", Some("java"), None), WAIT)
        .expect("save download");

    assert!(path.to_string_lossy().starts_with("snippet-"));
    assert!(path.to_string_lossy().ends_with(".java"));
    let posts = server
        .requests_to("/api/snippets")
        .into_iter()
        .filter(|request| request.method == "POST")
        .count();
    assert_eq!(posts, 1);
    assert_eq!(server.snippet_ids().len(), 1);
    assert_eq!(app.platform().save_count(), 1);
}

#[test]
fn execute_refuses_local_only_commands() {
    let mut app = app_with_session(&unused_base_url(), None);
    let result = execute(&mut app, Commands::Theme { toggle: false }, false, WAIT);
    assert!(result.is_err());
}

#[test]
fn cli_parses_login_without_echoing_password_env() {
    let _lock = env_lock().lock().expect("env lock");
    let _password = EnvGuard::remove("VAULT_PASSWORD");
    let cli = Cli::try_parse_from(["vpaste", "login", "tester"]).expect("cli should parse login");
    match cli.command {
        Commands::Login { username, password } => {
            assert_eq!(username, "tester");
            assert!(password.is_none());
        }
        _ => panic!("expected login command"),
    }
}

#[test]
fn login_returns_a_session_that_signs_later_commands_in() {
    let server = MockVaultServer::start().expect("server");
    let transport = HttpTransport::new(&server.base_url(), Duration::from_secs(3)).expect("transport");
    let cookie = commands::login(&transport, SESSION_USER, SESSION_PASSWORD).expect("login");
    assert_eq!(cookie, server.session_cookie());
    assert_eq!(
        format_session(&cookie, false).expect("format"),
        format!("export VAULT_SESSION='{}'", cookie)
    );

    let mut app = app_with_session(&server.base_url(), Some(&cookie));
    commands::create_snippet(&mut app, &form("signed", None, None), false, WAIT)
        .expect("create");
    assert_eq!(server.snippet_ids().len(), 1);
}

#[test]
fn refused_login_names_the_user() {
    let server = MockVaultServer::start().expect("server");
    let transport = HttpTransport::new(&server.base_url(), Duration::from_secs(3)).expect("transport");
    let err = commands::login(&transport, SESSION_USER, "nope").expect_err("refused");
    assert!(matches!(err, CommandError::LoginRefused(ref user) if user == SESSION_USER));

    let offline = HttpTransport::new(&unused_base_url(), Duration::from_secs(2)).expect("transport");
    assert!(matches!(
        commands::login(&offline, SESSION_USER, SESSION_PASSWORD),
        Err(CommandError::Login(_))
    ));
}
