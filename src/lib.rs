//! # nostr-relay-admin
//!
//! A Rust SDK for administering Nostr relays through NIP-86 management calls,
//! each authenticated with a freshly signed NIP-98 credential.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Shared newtypes, events, domain models (always available)
//! 2. **Auth** — NIP-98 credentials and the pluggable `Signer` capability
//! 3. **HTTP** — `RelayHttp` for NIP-86 (`POST`) and NIP-11 (`GET`)
//! 4. **WebSocket** — One-shot `tokio-tungstenite` queries for profile metadata
//! 5. **High-Level Client** — `RelayAdminClient` with nested sub-clients and
//!    list state; `MetadataCache` alongside it
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nostr_relay_admin::prelude::*;
//!
//! let client = RelayAdminClient::builder()
//!     .relay_url("wss://relay.example.com")
//!     .signer(Arc::new(KeySigner::generate()))
//!     .build()?;
//!
//! client.pubkeys().ban(pubkey, Some("spam")).await?;
//! let state = client.pubkeys().state().await;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Nostr event structure and id computation.
pub mod event;

/// Domain modules (vertical slices): types, state, sub-clients.
pub mod domain;

/// NIP-86 method registry and envelopes.
pub mod rpc;

/// Unified SDK error types.
pub mod error;

/// Wire constants and defaults.
pub mod network;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

/// NIP-98 credentials and the signing capability.
pub mod auth;

// ── Layer 3: HTTP ────────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: WebSocket ───────────────────────────────────────────────────────

/// Relay messages, filters, and the native query client.
pub mod ws;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `RelayAdminClient` — the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{EventIdHex, PubkeyHex, RelayUrl};

    // Events
    pub use crate::event::{Event, UnsignedEvent};

    // Domain types
    pub use crate::domain::events::EventEntry;
    pub use crate::domain::ips::IpEntry;
    pub use crate::domain::metadata::cache::MetadataCache;
    pub use crate::domain::metadata::source::MetadataSource;
    pub use crate::domain::metadata::{MetadataStatus, UserDisplay, UserMetadata};
    pub use crate::domain::pubkeys::state::{Notice, NoticeKind, PubkeyListState};
    pub use crate::domain::pubkeys::PubkeyEntry;
    pub use crate::domain::relay::RelayInfo;

    #[cfg(feature = "ws-native")]
    pub use crate::domain::metadata::source::RelayMetadataSource;

    // RPC
    pub use crate::rpc::{Method, RpcRequest, RpcResponse};

    // Errors
    pub use crate::error::{AdminError, AuthError, HttpError, ValidationError, WsError};

    // Auth
    pub use crate::auth::{payload_digest, HttpAuth, HttpMethod, Signer};
    #[cfg(feature = "native-auth")]
    pub use crate::auth::native::{verify_event, KeySigner};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        AuthClient, EventsClient, IpsClient, KindsClient, PubkeysClient, RelayAdminClient,
        RelayAdminClientBuilder, RelayClient, RpcClient,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // WebSocket types
    pub use crate::ws::{ClientMessage, Filter, RelayMessage};
    #[cfg(feature = "ws-native")]
    pub use crate::ws::native::RelayQuery;
}
