//! Profile metadata (kind 0) and its display model.
//!
//! - [`cache::MetadataCache`] resolves pubkeys to metadata, one fetch per key.
//! - [`source::MetadataSource`] is where the cache gets kind-0 events from.
//! - [`UserDisplay`] derives what a list row shows for a pubkey.

pub mod cache;
pub mod source;

use serde::{Deserialize, Serialize};

use crate::event::{Event, KIND_METADATA};

/// Parsed kind-0 content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub pubkey: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip05: Option<String>,
}

impl UserMetadata {
    /// Parse the content of a kind-0 event.
    ///
    /// The content must be a JSON object; fields that are not strings are
    /// ignored. Returns `None` for any other kind or unparsable content.
    pub fn from_event(pubkey: &str, event: &Event) -> Option<Self> {
        if event.kind != KIND_METADATA {
            return None;
        }
        let value: serde_json::Value = match serde_json::from_str(&event.content) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(pubkey, error = %e, "Unparsable metadata content");
                return None;
            }
        };
        let Some(object) = value.as_object() else {
            tracing::debug!(pubkey, "Metadata content is not an object");
            return None;
        };

        let field = |name: &str| {
            object
                .get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Some(Self {
            pubkey: pubkey.to_string(),
            name: field("name"),
            display_name: field("display_name"),
            about: field("about"),
            picture: field("picture"),
            nip05: field("nip05"),
        })
    }

    /// The human-readable name, if the profile has one.
    pub fn username(&self) -> Option<&str> {
        non_empty(&self.display_name).or_else(|| non_empty(&self.name))
    }

    /// `display_name`, else `name`, else the raw pubkey.
    pub fn display_name(&self) -> &str {
        self.username().unwrap_or(&self.pubkey)
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// Cache state of one pubkey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataStatus {
    /// Never requested (or cleared, or expired).
    Absent,
    /// A fetch is in flight.
    Pending,
    /// Fetched; `None` means no usable profile exists.
    Resolved(Option<UserMetadata>),
}

impl MetadataStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, MetadataStatus::Pending)
    }

    pub fn metadata(&self) -> Option<&UserMetadata> {
        match self {
            MetadataStatus::Resolved(Some(m)) => Some(m),
            _ => None,
        }
    }
}

/// What a list row shows for one pubkey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDisplay {
    pub pubkey: String,
    /// Username when known, otherwise the pubkey.
    pub title: String,
    /// Whether `title` is a username (the pubkey then goes on a second line).
    pub shows_username: bool,
    pub nip05: Option<String>,
    pub is_loading: bool,
    pub reason: Option<String>,
}

impl UserDisplay {
    pub fn new(pubkey: &str, status: &MetadataStatus) -> Self {
        let metadata = status.metadata();
        let username = metadata.and_then(UserMetadata::username);
        Self {
            pubkey: pubkey.to_string(),
            title: username.unwrap_or(pubkey).to_string(),
            shows_username: username.is_some(),
            nip05: metadata.and_then(|m| non_empty(&m.nip05)).map(str::to_string),
            is_loading: status.is_pending(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: Option<&str>) -> Self {
        self.reason = reason.filter(|r| !r.is_empty()).map(str::to_string);
        self
    }

    /// Pubkey line under the username, when one is shown.
    pub fn secondary_line(&self) -> Option<&str> {
        self.shows_username.then_some(self.pubkey.as_str())
    }
}
