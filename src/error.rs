//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The relay answered 2xx but the envelope carried an `error` field.
    #[error("Relay error: {0}")]
    Rpc(String),

    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("No relay configured")]
    RelayNotSet,

    #[error("Another operation is already in progress")]
    OperationInProgress,

    /// The relay selection changed before the response arrived; the result
    /// was discarded.
    #[error("Relay changed while the request was in flight")]
    RelayChanged,

    #[error("Unexpected result for {method}: {reason}")]
    UnexpectedResult { method: String, reason: String },
}

impl AdminError {
    /// Message suitable for showing to the person operating the relay.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Rpc(message) => message.clone(),
            AdminError::Validation(e) => e.to_string(),
            AdminError::Auth(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// Input rejected before any network work begins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid pubkey (expected 64 hex characters): {0}")]
    InvalidPubkey(String),

    #[error("Invalid event id (expected 64 hex characters): {0}")]
    InvalidEventId(String),

    #[error("Invalid IP address: {0}")]
    InvalidIp(String),

    #[error("Please enter a relay URL")]
    EmptyRelayUrl,

    #[error("Invalid relay URL: {0}")]
    InvalidRelayUrl(String),

    #[error("Relay URL must use WebSocket protocol (ws:// or wss://), got {0}://")]
    UnsupportedScheme(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP {status} {status_text}")]
    Status { status: u16, status_text: String },

    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Signing capability errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No signing capability available; install or enable a Nostr signer")]
    CapabilityUnavailable,

    #[error("Signer rejected the request: {0}")]
    Rejected(String),

    #[error("Signer did not respond within {0} seconds")]
    Timeout(u64),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid authorization header: {0}")]
    InvalidHeader(String),

    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    #[error("Credential mismatch on {field}: expected {expected}, got {actual}")]
    Mismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
}

/// WebSocket errors.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Subscription closed by relay: {0}")]
    Closed(String),

    #[error("Timed out waiting for relay")]
    Timeout,
}
