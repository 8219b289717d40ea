//! In-memory snippet table behind the mock service.

use chrono::{DateTime, Duration, Local, Utc};
use serde::Serialize;
use vaultpaste_core::DEFAULT_EXPIRY_MINUTES;

/// Owner of snippets created through the HTTP API.
pub const SESSION_USER: &str = "tester";

/// Password the mock accepts for [`SESSION_USER`].
pub const SESSION_PASSWORD: &str = "correct-horse";

/// Servlet session id handed out on a successful login.
pub(crate) const SESSION_ID: &str = "5F2A9C0DE1B7";

/// Owner used for rows the session user may not delete.
pub const FOREIGN_USER: &str = "someone-else";

/// Longest lifetime the service grants, in minutes.
const MAX_EXPIRY_MINUTES: i64 = 360;

/// Lifetime applied to non-positive requests, in minutes.
const MIN_FALLBACK_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnippet {
    pub id: String,
    pub content: String,
    pub language: String,
    pub title: Option<String>,
    pub owner: Option<String>,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl StoredSnippet {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires
    }
}

/// One request as the service saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub cache_control: Option<String>,
    pub pragma: Option<String>,
}

/// Clamp a requested lifetime the way the service does.
pub fn effective_expiry_minutes(requested: Option<i64>) -> i64 {
    let minutes = requested.unwrap_or(i64::from(DEFAULT_EXPIRY_MINUTES));
    if minutes > MAX_EXPIRY_MINUTES {
        MAX_EXPIRY_MINUTES
    } else if minutes < 1 {
        MIN_FALLBACK_MINUTES
    } else {
        minutes
    }
}

#[derive(Debug, Default)]
pub(crate) struct Store {
    snippets: Vec<StoredSnippet>,
    requests: Vec<RecordedRequest>,
}

impl Store {
    pub(crate) fn insert(
        &mut self,
        content: &str,
        language: &str,
        title: Option<&str>,
        expiry_minutes: Option<i64>,
        owner: Option<&str>,
    ) -> StoredSnippet {
        let created = Utc::now();
        let snippet = StoredSnippet {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            language: language.to_string(),
            title: title.map(str::to_string),
            owner: owner.map(str::to_string),
            created,
            expires: created + Duration::minutes(effective_expiry_minutes(expiry_minutes)),
        };
        self.snippets.push(snippet.clone());
        snippet
    }

    /// Live snippet by id; expired rows read as missing.
    pub(crate) fn get(&self, id: &str) -> Option<&StoredSnippet> {
        let now = Utc::now();
        self.snippets
            .iter()
            .find(|snippet| snippet.id == id && !snippet.is_expired(now))
    }

    /// The owner's snippets, newest first.
    pub(crate) fn history(&self, owner: &str) -> Vec<StoredSnippet> {
        let now = Utc::now();
        let mut rows: Vec<StoredSnippet> = self
            .snippets
            .iter()
            .filter(|snippet| snippet.owner.as_deref() == Some(owner) && !snippet.is_expired(now))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created.cmp(&a.created));
        rows
    }

    /// Remove `id` if `owner` created it.
    pub(crate) fn delete(&mut self, id: &str, owner: &str) -> bool {
        let before = self.snippets.len();
        self.snippets
            .retain(|snippet| !(snippet.id == id && snippet.owner.as_deref() == Some(owner)));
        self.snippets.len() != before
    }

    /// Drop `id` regardless of owner.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.snippets.len();
        self.snippets.retain(|snippet| snippet.id != id);
        self.snippets.len() != before
    }

    pub(crate) fn expire(&mut self, id: &str) -> bool {
        match self.snippets.iter_mut().find(|snippet| snippet.id == id) {
            Some(snippet) => {
                snippet.expires = Utc::now() - Duration::minutes(1);
                true
            }
            None => false,
        }
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.snippets.iter().map(|snippet| snippet.id.clone()).collect()
    }

    pub(crate) fn record(&mut self, request: RecordedRequest) {
        self.requests.push(request);
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.clone()
    }
}

/// JSON shape the service emits: zone-less local timestamps.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSnippet {
    id: String,
    encrypted_content: String,
    language: String,
    title: Option<String>,
    creator_username: Option<String>,
    creation_date: String,
    expiry_date: String,
}

fn local_wire_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.f")
        .to_string()
}

impl From<&StoredSnippet> for WireSnippet {
    fn from(value: &StoredSnippet) -> Self {
        Self {
            id: value.id.clone(),
            encrypted_content: value.content.clone(),
            language: value.language.clone(),
            title: value.title.clone(),
            creator_username: value.owner.clone(),
            creation_date: local_wire_time(value.created),
            expiry_date: local_wire_time(value.expires),
        }
    }
}
