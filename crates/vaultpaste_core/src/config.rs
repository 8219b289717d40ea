//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_COPY_FEEDBACK_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_URL, DEFAULT_VIEW_PATH,
    SESSION_COOKIE_NAME,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the VaultPaste client.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server_url: String,
    pub view_path: String,
    pub request_timeout_secs: u64,
    pub copy_feedback_ms: u64,
    pub prefs_path: String,
    pub download_dir: String,
    pub http_log: bool,
    /// Signed-in session as `NAME=value`; a bare value names the servlet cookie.
    pub session: Option<String>,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Normalize a view path so it always starts with `/`.
///
/// # Returns
/// The path with a single leading slash, or the default view path when blank.
pub fn normalize_view_path(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_VIEW_PATH.to_string();
    }
    format!("/{}", trimmed)
}

/// Turn a configured session into a `NAME=value` cookie pair.
///
/// # Returns
/// `None` for blank input; bare values are paired with [`SESSION_COOKIE_NAME`].
pub fn session_cookie_pair(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains('=') {
        Some(trimmed.to_string())
    } else {
        Some(format!("{}={}", SESSION_COOKIE_NAME, trimmed))
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            server_url: non_blank_var("VAULT_SERVER")
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            view_path: non_blank_var("VAULT_VIEW_PATH")
                .map(|path| normalize_view_path(&path))
                .unwrap_or_else(|| DEFAULT_VIEW_PATH.to_string()),
            request_timeout_secs: env::var("VAULT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            copy_feedback_ms: env::var("VAULT_COPY_FEEDBACK_MS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_COPY_FEEDBACK_MS),
            prefs_path: non_blank_var("VAULT_PREFS_PATH")
                .map(expand_tilde)
                .unwrap_or_else(|| {
                    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                    home.join(".config")
                        .join("vaultpaste")
                        .join("prefs.json")
                        .to_string_lossy()
                        .to_string()
                }),
            download_dir: non_blank_var("VAULT_DOWNLOAD_DIR")
                .map(expand_tilde)
                .unwrap_or_else(|| ".".to_string()),
            http_log: env_flag_enabled("VAULT_HTTP_LOG"),
            session: env::var("VAULT_SESSION")
                .ok()
                .and_then(|raw| session_cookie_pair(&raw)),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Lifetime of the "Copied!" acknowledgement as a [`Duration`].
    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}
