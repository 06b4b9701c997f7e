//! Deduplicating, memoizing metadata cache.
//!
//! Each pubkey gets one slot holding a `OnceCell`. The first caller to reach
//! an empty slot runs the fetch; everyone else awaits the same cell, so there
//! is at most one fetch per pubkey however many callers race. Failed or empty
//! lookups resolve to `None` and are cached like successes.
//!
//! Entries never expire unless a TTL is set with [`MetadataCache::with_ttl`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_lock::{OnceCell, RwLock};
use futures_util::future::join_all;

use crate::domain::metadata::source::MetadataSource;
use crate::domain::metadata::{MetadataStatus, UserDisplay, UserMetadata};
use crate::shared::is_hex64;

struct Resolved {
    metadata: Option<UserMetadata>,
    at: Instant,
}

type Slot = Arc<OnceCell<Resolved>>;

/// Metadata cache over a [`MetadataSource`].
///
/// Owned by the application and shared by reference or `Arc`; there is no
/// process-wide instance.
pub struct MetadataCache {
    source: Arc<dyn MetadataSource>,
    entries: RwLock<HashMap<String, Slot>>,
    ttl: Option<Duration>,
}

impl MetadataCache {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
            ttl: None,
        }
    }

    /// Refetch entries older than `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Metadata for `pubkey`, fetching at most once.
    ///
    /// Malformed pubkeys resolve to `None` without a fetch and are not cached.
    pub async fn resolve(&self, pubkey: &str) -> Option<UserMetadata> {
        if !is_hex64(pubkey) {
            tracing::debug!(pubkey, "Not resolving malformed pubkey");
            return None;
        }
        let key = pubkey.to_ascii_lowercase();
        let slot = self.slot(&key).await;
        let resolved = slot.get_or_init(|| self.load(&key)).await;
        resolved.metadata.clone()
    }

    /// Resolve a batch. Duplicates are collapsed and distinct keys are
    /// fetched concurrently. The result is keyed by the strings passed in.
    pub async fn resolve_many<S: AsRef<str>>(
        &self,
        pubkeys: &[S],
    ) -> HashMap<String, Option<UserMetadata>> {
        let mut seen = HashSet::new();
        let distinct: Vec<&str> = pubkeys
            .iter()
            .map(AsRef::as_ref)
            .filter(|pk| seen.insert(*pk))
            .collect();

        let results = join_all(distinct.iter().map(|pk| self.resolve(pk))).await;
        distinct
            .into_iter()
            .map(str::to_string)
            .zip(results)
            .collect()
    }

    /// Current state of `pubkey`, without fetching.
    pub async fn status(&self, pubkey: &str) -> MetadataStatus {
        let key = pubkey.to_ascii_lowercase();
        let entries = self.entries.read().await;
        match entries.get(&key) {
            None => MetadataStatus::Absent,
            Some(slot) => match slot.get() {
                None => MetadataStatus::Pending,
                Some(r) if self.is_expired(r) => MetadataStatus::Absent,
                Some(r) => MetadataStatus::Resolved(r.metadata.clone()),
            },
        }
    }

    /// Snapshot for a batch, keyed by the strings passed in.
    pub async fn statuses<S: AsRef<str>>(&self, pubkeys: &[S]) -> HashMap<String, MetadataStatus> {
        let mut out = HashMap::with_capacity(pubkeys.len());
        for pk in pubkeys {
            let pk = pk.as_ref();
            if !out.contains_key(pk) {
                out.insert(pk.to_string(), self.status(pk).await);
            }
        }
        out
    }

    /// Display model for `pubkey` from its current state.
    pub async fn display(&self, pubkey: &str) -> UserDisplay {
        UserDisplay::new(pubkey, &self.status(pubkey).await)
    }

    /// Drop every resolved entry. Fetches still in flight keep their slot,
    /// so later callers join them instead of starting a second fetch.
    pub async fn clear(&self) {
        self.entries.write().await.retain(|_, slot| slot.get().is_none());
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Existing live slot for `key`, or a fresh empty one.
    async fn slot(&self, key: &str) -> Slot {
        {
            let entries = self.entries.read().await;
            if let Some(slot) = entries.get(key) {
                if !slot.get().is_some_and(|r| self.is_expired(r)) {
                    return slot.clone();
                }
            }
        }

        let mut entries = self.entries.write().await;
        // Another task may have replaced it between the two locks.
        if let Some(slot) = entries.get(key) {
            if !slot.get().is_some_and(|r| self.is_expired(r)) {
                return slot.clone();
            }
        }
        let slot: Slot = Arc::new(OnceCell::new());
        entries.insert(key.to_string(), slot.clone());
        slot
    }

    fn is_expired(&self, resolved: &Resolved) -> bool {
        self.ttl.is_some_and(|ttl| resolved.at.elapsed() >= ttl)
    }

    async fn load(&self, pubkey: &str) -> Resolved {
        let metadata = match self.source.fetch_latest(pubkey).await {
            Ok(Some(event)) => {
                let parsed = UserMetadata::from_event(pubkey, &event);
                if parsed.is_none() {
                    tracing::warn!(pubkey, "Discarding unparsable profile metadata");
                }
                parsed
            }
            Ok(None) => {
                tracing::debug!(pubkey, "No profile metadata found");
                None
            }
            Err(e) => {
                tracing::warn!(pubkey, error = %e, "Failed to fetch profile metadata");
                None
            }
        };
        Resolved {
            metadata,
            at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdminError, WsError};
    use crate::event::{Event, KIND_METADATA};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const ALICE: &str = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d";
    const BOB: &str = "82341f882b6eabcd2ba7f1ef90aad961cf074af15b9ef44a09f9d2a8fbfbe6a2";
    const NOBODY: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const BROKEN: &str = "0000000000000000000000000000000000000000000000000000000000000002";
    const OFFLINE: &str = "0000000000000000000000000000000000000000000000000000000000000003";

    fn profile(pubkey: &str, content: &str) -> Event {
        Event {
            id: "00".repeat(32),
            pubkey: pubkey.to_string(),
            created_at: 1_700_000_000,
            kind: KIND_METADATA,
            tags: vec![],
            content: content.to_string(),
            sig: "00".repeat(64),
        }
    }

    /// Counts fetches per pubkey; optionally blocks until released.
    #[derive(Default)]
    struct CountingSource {
        calls: std::sync::Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl CountingSource {
        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Default::default()
            }
        }

        fn calls_for(&self, pubkey: &str) -> usize {
            self.calls.lock().unwrap().get(pubkey).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl MetadataSource for CountingSource {
        async fn fetch_latest(&self, pubkey: &str) -> Result<Option<Event>, AdminError> {
            *self.calls.lock().unwrap().entry(pubkey.to_string()).or_default() += 1;
            self.total.fetch_add(1, Ordering::SeqCst);

            match &self.gate {
                Some(gate) => gate.notified().await,
                None => tokio::time::sleep(Duration::from_millis(20)).await,
            }

            match pubkey {
                ALICE => Ok(Some(profile(ALICE, r#"{"name":"alice","display_name":"Alice"}"#))),
                BOB => Ok(Some(profile(BOB, r#"{"name":"bob"}"#))),
                BROKEN => Ok(Some(profile(BROKEN, "{not json"))),
                OFFLINE => Err(WsError::Timeout.into()),
                _ => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_fetch() {
        let source = Arc::new(CountingSource::default());
        let cache = MetadataCache::new(source.clone());

        let results = join_all((0..10).map(|_| cache.resolve(ALICE))).await;

        assert_eq!(source.calls_for(ALICE), 1);
        for meta in results {
            assert_eq!(meta.unwrap().display_name(), "Alice");
        }
    }

    #[tokio::test]
    async fn test_resolved_entries_skip_io() {
        let source = Arc::new(CountingSource::default());
        let cache = MetadataCache::new(source.clone());

        cache.resolve(BOB).await;
        cache.resolve(BOB).await;
        cache.resolve(&BOB.to_uppercase()).await;
        assert_eq!(source.calls_for(BOB), 1);
    }

    #[tokio::test]
    async fn test_negative_results_are_cached() {
        let source = Arc::new(CountingSource::default());
        let cache = MetadataCache::new(source.clone());

        for pk in [NOBODY, BROKEN, OFFLINE] {
            assert_eq!(cache.resolve(pk).await, None);
            assert_eq!(cache.resolve(pk).await, None);
            assert_eq!(source.calls_for(pk), 1, "refetched {}", pk);
            assert_eq!(cache.status(pk).await, MetadataStatus::Resolved(None));
        }
    }

    #[tokio::test]
    async fn test_resolve_many_dedupes_and_overlaps() {
        let source = Arc::new(CountingSource::default());
        let cache = MetadataCache::new(source.clone());

        let first = [ALICE, BOB, ALICE, NOBODY];
        let second = [BOB, NOBODY, BOB];
        let (a, b) = tokio::join!(cache.resolve_many(&first), cache.resolve_many(&second));

        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 2);
        assert_eq!(a[BOB].as_ref().unwrap().display_name(), "bob");
        assert_eq!(b[NOBODY], None);
        assert_eq!(source.total.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(CountingSource::gated(gate.clone()));
        let cache = Arc::new(MetadataCache::new(source.clone()));

        assert_eq!(cache.status(ALICE).await, MetadataStatus::Absent);

        let task = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.resolve(ALICE).await })
        };
        while source.calls_for(ALICE) == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(cache.status(ALICE).await, MetadataStatus::Pending);
        let statuses = cache.statuses(&[ALICE, BOB]).await;
        assert_eq!(statuses[ALICE], MetadataStatus::Pending);
        assert_eq!(statuses[BOB], MetadataStatus::Absent);
        assert!(cache.display(ALICE).await.is_loading);

        gate.notify_one();
        let meta = task.await.unwrap().unwrap();
        assert_eq!(meta.name.as_deref(), Some("alice"));
        assert_eq!(
            cache.status(ALICE).await,
            MetadataStatus::Resolved(Some(meta))
        );
        assert_eq!(source.calls_for(ALICE), 1);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let source = Arc::new(CountingSource::default());
        let cache = MetadataCache::new(source.clone());

        cache.resolve(ALICE).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.status(ALICE).await, MetadataStatus::Absent);

        cache.resolve(ALICE).await;
        assert_eq!(source.calls_for(ALICE), 2);
    }

    #[tokio::test]
    async fn test_clear_keeps_in_flight_fetch() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(CountingSource::gated(gate.clone()));
        let cache = Arc::new(MetadataCache::new(source.clone()));

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.resolve(ALICE).await })
        };
        while source.calls_for(ALICE) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(cache.status(ALICE).await, MetadataStatus::Pending);

        cache.clear().await;
        assert_eq!(cache.status(ALICE).await, MetadataStatus::Pending);

        let second = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.resolve(ALICE).await })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(source.calls_for(ALICE), 1);

        gate.notify_one();
        let a = first.await.unwrap();
        let b = second.await.unwrap();
        assert_eq!(a.unwrap().display_name(), "Alice");
        assert_eq!(b.unwrap().display_name(), "Alice");
        assert_eq!(source.calls_for(ALICE), 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_ttl_expiry_refetches() {
        let source = Arc::new(CountingSource::default());
        let cache = MetadataCache::new(source.clone()).with_ttl(Duration::from_millis(30));

        cache.resolve(NOBODY).await;
        cache.resolve(NOBODY).await;
        assert_eq!(source.calls_for(NOBODY), 1);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.status(NOBODY).await, MetadataStatus::Absent);
        cache.resolve(NOBODY).await;
        assert_eq!(source.calls_for(NOBODY), 2);
    }

    #[tokio::test]
    async fn test_malformed_pubkey_never_fetches() {
        let source = Arc::new(CountingSource::default());
        let cache = MetadataCache::new(source.clone());

        assert_eq!(cache.resolve("npub1abc").await, None);
        assert_eq!(source.total.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty().await);
    }
}
