//! Download filename derivation and in-memory file payloads.

use crate::constants::DOWNLOAD_MIME;
use crate::models::LanguageTag;
use chrono::{DateTime, Utc};

/// An in-memory file ready to be handed to a save-as interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Reduce a title to one path component that cannot leave its directory.
///
/// Keeps the last segment after any `/` or `\`, drops control characters,
/// and rejects what is left when it is blank, `.`, or `..`.
pub fn safe_file_name(title: &str) -> Option<String> {
    let last = title
        .rsplit(|c| c == '/' || c == '\\')
        .find(|segment| !segment.trim().is_empty())?;
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    match cleaned {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Derive the download filename for a snippet.
///
/// Uses the title when present, otherwise `snippet-<unix millis>`, and appends
/// the language extension only when the name does not already end with it.
/// Titles are reduced with [`safe_file_name`] first.
///
/// # Arguments
/// - `language`: Raw language tag; unmapped tags use `.txt`.
/// - `title`: Optional title; blank titles count as absent.
/// - `now`: Clock reading used for the default name.
pub fn download_filename(language: &str, title: Option<&str>, now: DateTime<Utc>) -> String {
    let ext = LanguageTag::parse(language).extension();
    let mut filename = match title.and_then(safe_file_name) {
        Some(name) => name,
        None => format!("snippet-{}", now.timestamp_millis()),
    };
    if !filename.ends_with(ext) {
        filename.push_str(ext);
    }
    filename
}

/// Build the file payload for `content`.
pub fn prepare_download(
    content: &str,
    language: &str,
    title: Option<&str>,
    now: DateTime<Utc>,
) -> FileDownload {
    FileDownload {
        filename: download_filename(language, title, now),
        mime: DOWNLOAD_MIME,
        bytes: content.as_bytes().to_vec(),
    }
}
