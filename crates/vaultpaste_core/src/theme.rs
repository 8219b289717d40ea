//! Persisted light/dark theme preference.
//!
//! The preference lives under the `theme` key of a small JSON preferences
//! file. Anything other than `light` reads as dark.

use crate::constants::THEME_KEY;
use crate::error::AppError;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// Interpret a stored preference value.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label of the toggle control, naming the theme it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Dark Mode",
            Theme::Dark => "Light Mode",
        }
    }
}

/// File-backed preference store.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_prefs(&self) -> Map<String, Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!("no preferences at {}: {}", self.path.display(), err);
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!("ignoring malformed preferences file {}", self.path.display());
                Map::new()
            }
        }
    }

    /// Current theme; missing or unreadable preferences read as dark.
    pub fn load(&self) -> Theme {
        let prefs = self.read_prefs();
        Theme::from_stored(prefs.get(THEME_KEY).and_then(Value::as_str))
    }

    /// Persist `theme`, keeping any other keys in the file.
    ///
    /// # Errors
    /// Returns an error if the parent directory or file cannot be written.
    pub fn save(&self, theme: Theme) -> Result<(), AppError> {
        let mut prefs = self.read_prefs();
        prefs.insert(THEME_KEY.to_string(), Value::from(theme.as_str()));
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&Value::Object(prefs))?)?;
        Ok(())
    }

    /// Flip the stored theme and return the new value.
    ///
    /// # Errors
    /// Propagates write failures from [`ThemeStore::save`].
    pub fn toggle(&self) -> Result<Theme, AppError> {
        let next = self.load().toggled();
        self.save(next)?;
        Ok(next)
    }
}
