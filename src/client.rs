//! High-level client — `RelayAdminClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the shared relay/signer/list state, and the
//! accessor methods.

use crate::auth::client::Auth;
use crate::auth::Signer;
use crate::domain::events::client::Events;
use crate::domain::ips::client::Ips;
use crate::domain::kinds::client::Kinds;
use crate::domain::pubkeys::client::Pubkeys;
use crate::domain::pubkeys::state::PubkeyListState;
use crate::domain::relay::client::Relay;
use crate::error::{AdminError, ValidationError};
use crate::http::RelayHttp;
use crate::network::{DEFAULT_HTTP_TIMEOUT, DEFAULT_NOTICE_TTL, DEFAULT_SIGNER_TIMEOUT};
use crate::rpc::client::Rpc;
use crate::shared::RelayUrl;

use async_lock::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::auth::client::Auth as AuthClient;
pub use crate::domain::events::client::Events as EventsClient;
pub use crate::domain::ips::client::Ips as IpsClient;
pub use crate::domain::kinds::client::Kinds as KindsClient;
pub use crate::domain::pubkeys::client::Pubkeys as PubkeysClient;
pub use crate::domain::relay::client::Relay as RelayClient;
pub use crate::rpc::client::Rpc as RpcClient;

/// The primary entry point.
///
/// Cheap to clone; clones share the relay, signer, and list state.
#[derive(Clone)]
pub struct RelayAdminClient {
    pub(crate) http: RelayHttp,
    pub(crate) relay: Arc<RwLock<RelaySelection>>,
    pub(crate) signer: Arc<RwLock<Option<Arc<dyn Signer>>>>,
    pub(crate) signer_timeout: Duration,
    pub(crate) notice_ttl: Duration,
    pub(crate) pubkey_state: Arc<RwLock<PubkeyListState>>,
    /// Set while a list mutation is in flight.
    pub(crate) operating: Arc<AtomicBool>,
}

impl RelayAdminClient {
    pub fn builder() -> RelayAdminClientBuilder {
        RelayAdminClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }

    pub fn rpc(&self) -> Rpc<'_> {
        Rpc { client: self }
    }

    pub fn pubkeys(&self) -> Pubkeys<'_> {
        Pubkeys { client: self }
    }

    pub fn events(&self) -> Events<'_> {
        Events { client: self }
    }

    pub fn kinds(&self) -> Kinds<'_> {
        Kinds { client: self }
    }

    pub fn ips(&self) -> Ips<'_> {
        Ips { client: self }
    }

    pub fn relay(&self) -> Relay<'_> {
        Relay { client: self }
    }

    // ── Relay selection ──────────────────────────────────────────────────

    /// The configured relay, if any.
    pub async fn relay_url(&self) -> Option<RelayUrl> {
        self.relay.read().await.url.clone()
    }

    /// Point the client at a relay. List state from the previous relay is
    /// dropped, and results still in flight from it are discarded.
    pub async fn set_relay(&self, url: &str) -> Result<RelayUrl, ValidationError> {
        let relay = RelayUrl::parse(url)?;
        self.reselect(Some(relay.clone())).await;
        tracing::debug!(relay = %relay, "Relay selected");
        Ok(relay)
    }

    pub async fn clear_relay(&self) {
        self.reselect(None).await;
    }

    pub(crate) async fn relay_selection(&self) -> RelaySelection {
        self.relay.read().await.clone()
    }

    /// Whether `generation` is still the current relay selection.
    pub(crate) async fn is_current(&self, generation: u64) -> bool {
        self.relay.read().await.generation == generation
    }

    // Lock order: list state, then relay.
    async fn reselect(&self, url: Option<RelayUrl>) {
        let mut state = self.pubkey_state.write().await;
        self.relay.write().await.select(url);
        state.reset();
    }

    // ── Signer ───────────────────────────────────────────────────────────

    /// Install (or replace) the signing capability.
    pub async fn set_signer(&self, signer: Arc<dyn Signer>) {
        *self.signer.write().await = Some(signer);
    }

    pub async fn clear_signer(&self) {
        *self.signer.write().await = None;
    }

    pub(crate) fn is_operating(&self) -> bool {
        self.operating.load(Ordering::Acquire)
    }
}

/// The selected relay and how many times the selection has changed.
///
/// Work started against one selection must not write list state after the
/// generation moves on.
#[derive(Debug, Clone, Default)]
pub(crate) struct RelaySelection {
    pub(crate) url: Option<RelayUrl>,
    pub(crate) generation: u64,
}

impl RelaySelection {
    fn select(&mut self, url: Option<RelayUrl>) {
        self.url = url;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Holds the operating flag; released on drop, on every exit path.
pub(crate) struct OperationGuard {
    flag: Arc<AtomicBool>,
}

impl OperationGuard {
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, AdminError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AdminError::OperationInProgress)?;
        Ok(Self { flag: flag.clone() })
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct RelayAdminClientBuilder {
    relay_url: Option<String>,
    signer: Option<Arc<dyn Signer>>,
    timeout: Duration,
    signer_timeout: Duration,
    notice_ttl: Duration,
}

impl Default for RelayAdminClientBuilder {
    fn default() -> Self {
        Self {
            relay_url: None,
            signer: None,
            timeout: DEFAULT_HTTP_TIMEOUT,
            signer_timeout: DEFAULT_SIGNER_TIMEOUT,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}

impl RelayAdminClientBuilder {
    /// `ws://` or `wss://` address of the relay; validated in `build`.
    pub fn relay_url(mut self, url: &str) -> Self {
        self.relay_url = Some(url.to_string());
        self
    }

    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How long to wait for the signer on each call.
    pub fn signer_timeout(mut self, timeout: Duration) -> Self {
        self.signer_timeout = timeout;
        self
    }

    /// How long success/error notices stay visible.
    pub fn notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    pub fn build(self) -> Result<RelayAdminClient, AdminError> {
        let relay = self.relay_url.as_deref().map(RelayUrl::parse).transpose()?;

        Ok(RelayAdminClient {
            http: RelayHttp::new(self.timeout)?,
            relay: Arc::new(RwLock::new(RelaySelection {
                url: relay,
                generation: 0,
            })),
            signer: Arc::new(RwLock::new(self.signer)),
            signer_timeout: self.signer_timeout,
            notice_ttl: self.notice_ttl,
            pubkey_state: Arc::new(RwLock::new(PubkeyListState::new())),
            operating: Arc::new(AtomicBool::new(false)),
        })
    }
}
