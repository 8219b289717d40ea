//! Command-line host for the VaultPaste client.

mod commands;
mod host;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::{CommandError, SnippetForm};
use host::{HostLog, TerminalPlatform};
use serde_json::json;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vaultpaste_client::history::HistoryRow;
use vaultpaste_client::view::SnippetDisplay;
use vaultpaste_client::{spawn_backend, AppSettings, HttpTransport, Platform, VaultClientApp};
use vaultpaste_core::theme::{Theme, ThemeStore};
use vaultpaste_core::Config;

/// Extra time on top of the request timeout before a command gives up.
const SETTLE_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "vpaste", about = "VaultPaste CLI", version)]
struct Cli {
    /// Server URL (can also be set via VAULT_SERVER env var)
    #[arg(short, long, env = "VAULT_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Create a snippet from a file or stdin and print its share link
    New {
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        language: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// Lifetime in minutes (10, 60, 360, 1440, 10080)
        #[arg(short, long)]
        expiry: Option<String>,
        /// Copy the share link to the clipboard
        #[arg(short, long)]
        copy: bool,
    },
    /// Print a snippet by id or share link
    Get { target: String },
    /// List your active snippets, newest first
    History,
    /// Delete one of your snippets
    Delete { id: String },
    /// Save a snippet to a local file
    Download {
        target: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Save content to history, then write it to a local file
    SaveDownload {
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        language: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        expiry: Option<String>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Sign in and print the session to export as VAULT_SESSION
    Login {
        username: String,
        /// Password; read from stdin when omitted
        #[arg(long, env = "VAULT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Show or toggle the stored light/dark preference
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("vaultpaste=warn,vaultpaste_client=info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run_and_report<F, E>(runner: F) -> i32
where
    F: FnOnce() -> Result<(), E>,
    E: std::fmt::Display,
{
    match runner() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("vpaste: {}", err);
            1
        }
    }
}

fn explicit_server_override(server: Option<String>) -> Option<String> {
    server.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Environment configuration with command-line overrides applied.
fn resolve_config(server: Option<String>, timeout: Option<u64>) -> Config {
    let mut config = Config::from_env();
    if let Some(server) = explicit_server_override(server) {
        config.server_url = server;
    }
    if let Some(secs) = timeout.filter(|secs| *secs > 0) {
        config.request_timeout_secs = secs;
    }
    config
}

fn read_content(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn read_password() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn format_session(cookie: &str, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(&json!({ "session": cookie }));
    }
    Ok(format!("export VAULT_SESSION='{}'", cookie))
}

fn format_created(link: &str, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(&json!({ "link": link }));
    }
    Ok(format!("Created: {}", link))
}

fn format_snippet(display: &SnippetDisplay, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(&json!({
            "code": display.code,
            "language": display.badge,
            "title": display.title,
            "expires": display.expires,
        }));
    }
    Ok(display.code.clone())
}

fn format_history(rows: &[HistoryRow], json: bool) -> Result<String, serde_json::Error> {
    if json {
        let rows: Vec<_> = rows
            .iter()
            .map(|row| {
                json!({
                    "id": row.id,
                    "title": row.title,
                    "language": row.language,
                    "created": row.created,
                    "expires": row.expires,
                })
            })
            .collect();
        return serde_json::to_string_pretty(&rows);
    }
    if rows.is_empty() {
        return Ok(vaultpaste_client::history::EMPTY_MESSAGE.to_string());
    }
    Ok(rows
        .iter()
        .map(|row| {
            format!(
                "{:<36} {:<30} {:<12} expires {}",
                row.id, row.title, row.language, row.expires
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

fn format_saved(path: &Path, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(&json!({ "saved": path.display().to_string() }));
    }
    Ok(format!("Saved: {}", path.display()))
}

fn format_theme(theme: Theme, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(&json!({
            "theme": theme.as_str(),
            "toggle": theme.toggle_label(),
        }));
    }
    Ok(format!("{} (toggle: {})", theme.as_str(), theme.toggle_label()))
}

fn form_from_args(
    file: Option<&Path>,
    language: Option<String>,
    title: Option<String>,
    expiry: Option<String>,
) -> io::Result<SnippetForm> {
    Ok(SnippetForm {
        content: read_content(file)?,
        language,
        title,
        expiry,
    })
}

/// Run one network-backed subcommand and render its output.
fn execute<P: Platform + HostLog>(
    app: &mut VaultClientApp<P>,
    command: Commands,
    json: bool,
    wait: Duration,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match command {
        Commands::New {
            file,
            language,
            title,
            expiry,
            copy,
        } => {
            let form = form_from_args(file.as_deref(), language, title, expiry)?;
            let link = commands::create_snippet(app, &form, copy, wait)?;
            format_created(&link, json)?
        }
        Commands::Get { target } => {
            let display = commands::fetch_snippet(app, &target, wait)?;
            format_snippet(&display, json)?
        }
        Commands::History => {
            let rows = commands::list_history(app, wait)?;
            format_history(&rows, json)?
        }
        Commands::Delete { id } => {
            let rows = commands::delete_snippet(app, &id, wait)?;
            if json {
                serde_json::to_string_pretty(&json!({ "deleted": id, "remaining": rows.len() }))?
            } else {
                format!("Deleted snippet: {}", id)
            }
        }
        Commands::Download { target, .. } => {
            let path = commands::download_snippet(app, &target, wait)?;
            format_saved(&path, json)?
        }
        Commands::SaveDownload {
            file,
            language,
            title,
            expiry,
            ..
        } => {
            let form = form_from_args(file.as_deref(), language, title, expiry)?;
            let path = commands::save_then_download(app, &form, wait)?;
            format_saved(&path, json)?
        }
        Commands::Completions { .. } | Commands::Login { .. } | Commands::Theme { .. } => {
            return Err(Box::new(CommandError::Alert(
                "command does not talk to the server".to_string(),
            )));
        }
    };
    Ok(output)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        json,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing();
    let config = resolve_config(server, timeout);

    if let Commands::Theme { toggle } = &command {
        let store = ThemeStore::new(&config.prefs_path);
        let theme = if *toggle { store.toggle()? } else { store.load() };
        println!("{}", format_theme(theme, json)?);
        return Ok(());
    }

    if let Commands::Login { username, password } = &command {
        let transport = HttpTransport::from_config(&config)?;
        let password = match password {
            Some(password) => password.clone(),
            None => read_password()?,
        };
        let cookie = commands::login(&transport, username, &password)?;
        println!("{}", format_session(&cookie, json)?);
        return Ok(());
    }

    let settings = AppSettings::from_config(&config)?;
    let transport = HttpTransport::from_config(&config)?;
    let backend = spawn_backend(Arc::new(transport));
    let mut platform = TerminalPlatform::new(&config.download_dir);
    if let Commands::Download { out, .. } | Commands::SaveDownload { out, .. } = &command {
        platform.set_output(out.clone());
    }
    let mut app = VaultClientApp::new(backend, platform, settings);
    let wait = config.request_timeout() + SETTLE_GRACE;

    let output = execute(&mut app, command, json, wait)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

fn main() {
    std::process::exit(run_and_report(run));
}

#[cfg(test)]
mod tests;
