//! Pubkey list state — the client's cached view of the relay's lists.

use super::PubkeyEntry;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient status message after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub expires_at: Instant,
}

impl Notice {
    pub fn is_active_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Last known allowed and banned lists for the configured relay.
///
/// Membership only changes through [`PubkeyListState::replace_allowed`] and
/// [`PubkeyListState::replace_banned`], which the client calls after a full
/// reload. A failed mutation leaves both lists as they were.
#[derive(Debug, Clone, Default)]
pub struct PubkeyListState {
    allowed: Vec<PubkeyEntry>,
    banned: Vec<PubkeyEntry>,
    allowed_loaded: bool,
    banned_loaded: bool,
    notice: Option<Notice>,
}

impl PubkeyListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowed(&self) -> &[PubkeyEntry] {
        &self.allowed
    }

    pub fn banned(&self) -> &[PubkeyEntry] {
        &self.banned
    }

    pub fn is_allowed(&self, pubkey: &str) -> bool {
        self.allowed.iter().any(|e| e.matches(pubkey))
    }

    pub fn is_banned(&self, pubkey: &str) -> bool {
        self.banned.iter().any(|e| e.matches(pubkey))
    }

    /// Both lists have been fetched at least once.
    pub fn is_loaded(&self) -> bool {
        self.allowed_loaded && self.banned_loaded
    }

    pub fn replace_allowed(&mut self, entries: Vec<PubkeyEntry>) {
        self.allowed = entries;
        self.allowed_loaded = true;
    }

    pub fn replace_banned(&mut self, entries: Vec<PubkeyEntry>) {
        self.banned = entries;
        self.banned_loaded = true;
    }

    pub fn set_notice(&mut self, kind: NoticeKind, text: impl Into<String>, ttl: Duration) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
            expires_at: Instant::now() + ttl,
        });
    }

    /// The current notice, if it has not expired.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice_at(Instant::now())
    }

    pub fn notice_at(&self, now: Instant) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| n.is_active_at(now))
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Forget everything (relay changed).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
