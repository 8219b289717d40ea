//! Host side effects the controller cannot perform itself.

use crate::error::ClientError;
use reqwest::Url;
use vaultpaste_core::download::FileDownload;

/// Capabilities a host provides to the controller.
///
/// Every method runs on the UI thread.
pub trait Platform {
    /// Show a blocking, user-visible message.
    fn alert(&mut self, message: &str);

    /// Leave the client for `url` (login gate, external page).
    fn open_external(&mut self, url: &Url);

    /// Write `text` to the system clipboard.
    ///
    /// # Errors
    /// Returns [`ClientError::Clipboard`] when the clipboard is unavailable or
    /// access is denied.
    fn write_clipboard(&mut self, text: &str) -> Result<(), ClientError>;

    /// Selection-based copy used when the clipboard API refuses.
    ///
    /// # Errors
    /// Returns an error when the host has no fallback either.
    fn legacy_copy(&mut self, text: &str) -> Result<(), ClientError>;

    /// Run the save-as interaction for `download` and release any temporary
    /// resource afterwards.
    ///
    /// # Errors
    /// Returns [`ClientError::Save`] or an I/O error when the file cannot be
    /// written.
    fn save_file(&mut self, download: FileDownload) -> Result<(), ClientError>;
}

/// In-memory host that records every side effect.
///
/// Used by headless drivers and tests.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    alerts: Vec<String>,
    opened: Vec<Url>,
    clipboard: Option<String>,
    legacy_copies: Vec<String>,
    saved: Vec<FileDownload>,
    fail_clipboard: bool,
    fail_save: bool,
}

impl HeadlessPlatform {
    /// Make subsequent clipboard writes fail.
    pub fn fail_clipboard(&mut self, fail: bool) {
        self.fail_clipboard = fail;
    }

    /// Make subsequent saves fail.
    pub fn fail_save(&mut self, fail: bool) {
        self.fail_save = fail;
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn opened(&self) -> &[Url] {
        &self.opened
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn legacy_copies(&self) -> &[String] {
        &self.legacy_copies
    }

    pub fn saved(&self) -> &[FileDownload] {
        &self.saved
    }

    /// Drain recorded alerts.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}

impl Platform for HeadlessPlatform {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn open_external(&mut self, url: &Url) {
        self.opened.push(url.clone());
    }

    fn write_clipboard(&mut self, text: &str) -> Result<(), ClientError> {
        if self.fail_clipboard {
            return Err(ClientError::Clipboard("permission denied".to_string()));
        }
        self.clipboard = Some(text.to_string());
        Ok(())
    }

    fn legacy_copy(&mut self, text: &str) -> Result<(), ClientError> {
        self.legacy_copies.push(text.to_string());
        Ok(())
    }

    fn save_file(&mut self, download: FileDownload) -> Result<(), ClientError> {
        if self.fail_save {
            return Err(ClientError::Save(format!(
                "cannot write {}",
                download.filename
            )));
        }
        self.saved.push(download);
        Ok(())
    }
}
