//! Event moderation.

#[cfg(feature = "http")]
pub mod client;

use serde::{Deserialize, Serialize};

/// One row of `listbannedevents` / `listeventsneedingmoderation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
