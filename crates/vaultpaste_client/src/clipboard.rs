//! "Copy Link" control with a timed acknowledgement.

use crate::platform::Platform;
use std::time::{Duration, Instant};
use tracing::warn;

pub const COPY_LABEL: &str = "Copy Link";
pub const COPIED_LABEL: &str = "Copied!";
/// Alert shown after the selection-based fallback copy.
pub const FALLBACK_COPY_ALERT: &str = "Copied to clipboard!";

/// How a copy attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyResult {
    /// Nothing to copy.
    Skipped,
    /// The platform clipboard accepted the text.
    Copied,
    /// The clipboard refused; the legacy path ran and the user was alerted.
    FellBack,
}

#[derive(Debug, Clone)]
pub struct CopyButton {
    feedback: Duration,
    copied_until: Option<Instant>,
}

impl CopyButton {
    pub fn new(feedback: Duration) -> Self {
        Self {
            feedback,
            copied_until: None,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.copied_until.is_some() {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }

    /// Revert the label once the acknowledgement has expired.
    ///
    /// # Returns
    /// `true` when the label changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.copied_until {
            Some(until) if now >= until => {
                self.copied_until = None;
                true
            }
            _ => false,
        }
    }

    /// Copy `link` through `platform`, falling back to the legacy mechanism.
    pub fn copy(&mut self, platform: &mut dyn Platform, link: &str, now: Instant) -> CopyResult {
        if link.is_empty() {
            return CopyResult::Skipped;
        }
        match platform.write_clipboard(link) {
            Ok(()) => {
                self.copied_until = Some(now + self.feedback);
                CopyResult::Copied
            }
            Err(err) => {
                warn!("Failed to copy: {}", err);
                if let Err(err) = platform.legacy_copy(link) {
                    warn!("legacy copy failed: {}", err);
                }
                platform.alert(FALLBACK_COPY_ALERT);
                CopyResult::FellBack
            }
        }
    }
}
