//! Wire constants and defaults shared by the HTTP and WebSocket layers.

use std::time::Duration;

/// `Content-Type` for NIP-86 management requests.
pub const RPC_CONTENT_TYPE: &str = "application/nostr+json+rpc";

/// `Accept` header for NIP-11 relay information documents.
pub const RELAY_INFO_ACCEPT: &str = "application/nostr+json";

/// `Authorization` scheme for NIP-98 credentials.
pub const AUTH_SCHEME: &str = "Nostr";

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time to wait for the signing capability (it may prompt a human).
pub const DEFAULT_SIGNER_TIMEOUT: Duration = Duration::from_secs(60);

/// Default time a success/error notice stays visible.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Default time to wait for a relay to answer a metadata query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);
