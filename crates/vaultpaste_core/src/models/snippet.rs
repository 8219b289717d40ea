//! Snippet projections returned by the service and the create payload.

use super::language::LanguageTag;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A stored snippet as delivered by the detail endpoint.
///
/// `encrypted_content` arrives already resolved by the service; the client
/// treats it as opaque display text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub encrypted_content: String,
    pub language: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub creation_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub expiry_date: DateTime<Utc>,
}

/// History row payload. Extra fields sent by the service are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnippetSummary {
    pub id: String,
    pub language: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub creation_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub expiry_date: DateTime<Utc>,
}

/// The part of a create response the client relies on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedSnippet {
    pub id: String,
}

/// Request payload for creating a snippet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnippetRequest {
    pub content: String,
    pub language: String,
    pub title: Option<String>,
    /// Minutes until expiry; the service applies its default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<u32>,
}

impl CreateSnippetRequest {
    /// Build a request from raw form values.
    ///
    /// Blank titles are sent as `null`; an expiry that is not a whole number
    /// is omitted so the service default applies.
    pub fn from_form(content: &str, language: &str, title: &str, expiry: &str) -> Self {
        let title = title.trim();
        Self {
            content: content.to_string(),
            language: language.to_string(),
            title: (!title.is_empty()).then(|| title.to_string()),
            expiry_time: expiry.trim().parse().ok(),
        }
    }
}

impl Snippet {
    pub fn language_tag(&self) -> LanguageTag {
        LanguageTag::parse(&self.language)
    }

    /// Title when present and not blank.
    pub fn display_title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }
}

impl SnippetSummary {
    pub fn language_tag(&self) -> LanguageTag {
        LanguageTag::parse(&self.language)
    }

    pub fn display_title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }
}

impl From<&Snippet> for SnippetSummary {
    fn from(value: &Snippet) -> Self {
        Self {
            id: value.id.clone(),
            language: value.language.clone(),
            title: value.title.clone(),
            creation_date: value.creation_date,
            expiry_date: value.expiry_date,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Render a timestamp in the viewer's local time zone.
pub fn format_local_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%c").to_string()
}

/// Accept RFC 3339 timestamps, or zone-less ones which are read as local time.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("bad timestamp '{}'", raw)))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
