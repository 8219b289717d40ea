//! Data models shared by the client, host binaries, and test servers.

/// Fixed language table: display names, icons, and file extensions.
pub mod language;
/// Snippet projections and request payloads.
pub mod snippet;


pub use language::{Language, LanguageIcon, LanguageTag, GENERIC_ICON_CLASS, PLAINTEXT_BADGE};
pub use snippet::{
    format_local_timestamp, CreateSnippetRequest, CreatedSnippet, Snippet, SnippetSummary,
};
