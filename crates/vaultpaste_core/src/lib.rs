//! Core domain library for VaultPaste (config, models, download naming, theme).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across crates.
pub mod constants;
/// Download filename derivation and file payloads.
pub mod download;
/// Process-global environment mutation helpers.
pub mod env;
/// Application error types.
pub mod error;
/// Snippet projections, requests, and the language table.
pub mod models;
/// Persisted light/dark theme preference.
pub mod theme;

pub use config::Config;
pub use constants::{
    DEFAULT_EXPIRY_MINUTES, DEFAULT_SERVER_URL, DEFAULT_VIEW_PATH, SESSION_COOKIE_NAME, THEME_KEY,
};
pub use error::AppError;
