//! Terminal implementation of the controller's host capabilities.

use reqwest::Url;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use vaultpaste_client::{ClientError, HeadlessPlatform, Platform};
use vaultpaste_core::download::FileDownload;

/// Side effects a command reads back from the host after driving the app.
pub(crate) trait HostLog {
    fn alert_log(&self) -> &[String];
    fn external_log(&self) -> &[Url];
    fn save_count(&self) -> usize;
    /// Where the most recent download went.
    fn last_saved(&self) -> Option<PathBuf>;
}

/// Attempts at a numbered name before a save gives up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Where a download lands: the explicit output path, or `dir/filename`.
///
/// Only the final component of `filename` is used, so a derived name can never
/// point outside `dir`.
pub(crate) fn download_target(
    dir: &Path,
    out: Option<&Path>,
    filename: &str,
) -> Result<PathBuf, ClientError> {
    if let Some(path) = out {
        return Ok(path.to_path_buf());
    }
    match Path::new(filename).file_name() {
        Some(name) if Path::new(name) == Path::new(filename) => Ok(dir.join(name)),
        _ => Err(ClientError::Save(format!(
            "refusing to save outside {}: {:?}",
            dir.display(),
            filename
        ))),
    }
}

/// `demo.py` becomes `demo (n).py`.
fn numbered_target(target: &Path, n: u32) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match target.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    };
    target.with_file_name(name)
}

/// Write `bytes` to a staging file next to `target`, then move it into place.
///
/// With `overwrite` unset an existing file is kept and the download takes the
/// first free numbered name instead. Returns the path actually written.
pub(crate) fn persist_download(
    target: &Path,
    bytes: &[u8],
    overwrite: bool,
) -> Result<PathBuf, ClientError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let mut staged = NamedTempFile::new_in(&dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;

    if overwrite {
        staged
            .persist(target)
            .map_err(|err| ClientError::Save(format!("{}: {}", target.display(), err.error)))?;
        return Ok(target.to_path_buf());
    }

    let mut candidate = target.to_path_buf();
    for attempt in 1..=MAX_NAME_ATTEMPTS {
        match staged.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(taken = %candidate.display(), "download name in use");
                staged = err.file;
                candidate = numbered_target(target, attempt);
            }
            Err(err) => {
                return Err(ClientError::Save(format!(
                    "{}: {}",
                    candidate.display(),
                    err.error
                )))
            }
        }
    }
    Err(ClientError::Save(format!(
        "{}: no free file name",
        target.display()
    )))
}

pub(crate) struct TerminalPlatform {
    download_dir: PathBuf,
    output: Option<PathBuf>,
    clipboard: Option<arboard::Clipboard>,
    alerts: Vec<String>,
    external: Vec<Url>,
    saved: Vec<PathBuf>,
}

impl TerminalPlatform {
    pub(crate) fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            output: None,
            clipboard: None,
            alerts: Vec::new(),
            external: Vec::new(),
            saved: Vec::new(),
        }
    }

    /// Send the next download to `path` instead of the download directory.
    pub(crate) fn set_output(&mut self, path: Option<PathBuf>) {
        self.output = path;
    }

    fn clipboard(&mut self) -> Result<&mut arboard::Clipboard, ClientError> {
        if self.clipboard.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|err| ClientError::Clipboard(err.to_string()))?;
            self.clipboard = Some(clipboard);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| ClientError::Clipboard("clipboard not initialized".to_string()))
    }
}

impl Platform for TerminalPlatform {
    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
        self.alerts.push(message.to_string());
    }

    fn open_external(&mut self, url: &Url) {
        eprintln!("Continue in a browser: {}", url);
        self.external.push(url.clone());
    }

    fn write_clipboard(&mut self, text: &str) -> Result<(), ClientError> {
        self.clipboard()?
            .set_text(text.to_string())
            .map_err(|err| ClientError::Clipboard(err.to_string()))
    }

    fn legacy_copy(&mut self, text: &str) -> Result<(), ClientError> {
        // A terminal selection is the only fallback left.
        println!("{}", text);
        Ok(())
    }

    fn save_file(&mut self, download: FileDownload) -> Result<(), ClientError> {
        let target = download_target(
            &self.download_dir,
            self.output.as_deref(),
            &download.filename,
        )?;
        debug!(mime = download.mime, target = %target.display(), "saving download");
        // An explicit --out path is the user's choice to replace.
        let written = persist_download(&target, &download.bytes, self.output.is_some())?;
        info!(target = %written.display(), bytes = download.bytes.len(), "download written");
        self.saved.push(written);
        Ok(())
    }
}

impl HostLog for TerminalPlatform {
    fn alert_log(&self) -> &[String] {
        &self.alerts
    }

    fn external_log(&self) -> &[Url] {
        &self.external
    }

    fn save_count(&self) -> usize {
        self.saved.len()
    }

    fn last_saved(&self) -> Option<PathBuf> {
        self.saved.last().cloned()
    }
}

impl HostLog for HeadlessPlatform {
    fn alert_log(&self) -> &[String] {
        self.alerts()
    }

    fn external_log(&self) -> &[Url] {
        self.opened()
    }

    fn save_count(&self) -> usize {
        self.saved().len()
    }

    fn last_saved(&self) -> Option<PathBuf> {
        self.saved()
            .last()
            .map(|download| PathBuf::from(&download.filename))
    }
}
