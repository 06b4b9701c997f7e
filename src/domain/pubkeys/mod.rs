//! Allowed and banned public keys.

#[cfg(feature = "http")]
pub mod client;
pub mod state;

use serde::{Deserialize, Serialize};

/// One row of `listallowedpubkeys` / `listbannedpubkeys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubkeyEntry {
    pub pubkey: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PubkeyEntry {
    pub fn matches(&self, pubkey: &str) -> bool {
        self.pubkey.eq_ignore_ascii_case(pubkey)
    }
}

/// Which list a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PubkeyList {
    Allowed,
    Banned,
}
