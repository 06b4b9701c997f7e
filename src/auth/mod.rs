//! HTTP authentication — NIP-98 credentials and the signing capability.
//!
//! ## Credential model
//!
//! Every management request carries a freshly signed kind-27235 event bound to
//! the target URL, the HTTP method, and the SHA-256 of the exact body bytes.
//! The event travels base64-encoded in `Authorization: Nostr <token>`.
//! Credentials are built per request and never cached or reused.
//!
//! ## Signing capability
//!
//! The SDK never holds key material of its own. Signing goes through a
//! [`Signer`] supplied by the application (a browser extension bridge, a
//! remote bunker, or the local [`native::KeySigner`] behind `native-auth`).

#[cfg(feature = "http")]
pub mod client;

#[cfg(feature = "native-auth")]
pub mod native;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::AuthError;
use crate::event::{Event, UnsignedEvent};
use crate::network::AUTH_SCHEME;

/// Kind of NIP-98 HTTP auth events.
pub const KIND_HTTP_AUTH: u16 = 27235;

/// Default acceptance window a verifier applies to `created_at`, in seconds.
pub const DEFAULT_TIMESTAMP_WINDOW: u64 = 60;

// ============================================================================
// Signing capability
// ============================================================================

/// External signing capability.
///
/// Implementations may prompt a human, so calls can take a while; the client
/// bounds them with its signer timeout.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Hex public key of the signing identity.
    async fn public_key(&self) -> Result<String, AuthError>;

    /// Fill in `id` and `sig` for the event.
    async fn sign_event(&self, event: UnsignedEvent) -> Result<Event, AuthError>;
}

// ============================================================================
// Credential construction
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request binding carried in a credential's tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpAuth {
    pub url: String,
    pub method: HttpMethod,
    pub payload_hash: Option<String>,
}

impl HttpAuth {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            payload_hash: None,
        }
    }

    pub fn with_payload_hash(mut self, hash: impl Into<String>) -> Self {
        self.payload_hash = Some(hash.into());
        self
    }

    /// Tags in wire order: `u`, `method`, then `payload` when present.
    pub fn to_tags(&self) -> Vec<Vec<String>> {
        let mut tags = vec![
            vec!["u".to_string(), self.url.clone()],
            vec!["method".to_string(), self.method.as_str().to_string()],
        ];
        if let Some(hash) = &self.payload_hash {
            tags.push(vec!["payload".to_string(), hash.clone()]);
        }
        tags
    }

    pub fn from_tags(tags: &[Vec<String>]) -> Result<Self, AuthError> {
        let value = |name: &str| {
            tags.iter()
                .find(|t| t.first().map(String::as_str) == Some(name))
                .and_then(|t| t.get(1))
                .cloned()
        };

        let url = value("u").ok_or(AuthError::MissingTag("u"))?;
        let method_raw = value("method").ok_or(AuthError::MissingTag("method"))?;
        let method = HttpMethod::parse(&method_raw).ok_or_else(|| {
            AuthError::InvalidHeader(format!("unknown HTTP method {}", method_raw))
        })?;

        Ok(Self {
            url,
            method,
            payload_hash: value("payload"),
        })
    }

    /// Unsigned kind-27235 event with empty content.
    pub fn to_unsigned_event(&self, pubkey: impl Into<String>, created_at: u64) -> UnsignedEvent {
        UnsignedEvent {
            pubkey: pubkey.into(),
            created_at,
            kind: KIND_HTTP_AUTH,
            tags: self.to_tags(),
            content: String::new(),
        }
    }
}

/// Lowercase hex SHA-256 of the exact request body.
pub fn payload_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Current wall clock in whole unix seconds.
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

// ============================================================================
// Header encoding
// ============================================================================

/// `Nostr <base64(event JSON)>`.
pub fn encode_authorization_header(event: &Event) -> Result<String, AuthError> {
    let json =
        serde_json::to_string(event).map_err(|e| AuthError::SigningFailed(e.to_string()))?;
    Ok(format!("{} {}", AUTH_SCHEME, BASE64.encode(json.as_bytes())))
}

/// Parse an `Authorization` header value back into the signed event.
pub fn decode_authorization_header(header: &str) -> Result<Event, AuthError> {
    let token = header
        .strip_prefix(AUTH_SCHEME)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidHeader(format!("expected \"{} <token>\"", AUTH_SCHEME)))?;

    let bytes = BASE64
        .decode(token)
        .map_err(|e| AuthError::InvalidHeader(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidHeader(e.to_string()))
}

// ============================================================================
// Verification
// ============================================================================

/// What a verifier expects a credential to be bound to.
#[derive(Debug, Clone)]
pub struct ValidationParams {
    pub url: String,
    pub method: HttpMethod,
    pub payload_hash: Option<String>,
    pub now: u64,
    pub timestamp_window: u64,
}

impl ValidationParams {
    pub fn new(url: impl Into<String>, method: HttpMethod, now: u64) -> Self {
        Self {
            url: url.into(),
            method,
            payload_hash: None,
            now,
            timestamp_window: DEFAULT_TIMESTAMP_WINDOW,
        }
    }

    pub fn with_payload_hash(mut self, hash: impl Into<String>) -> Self {
        self.payload_hash = Some(hash.into());
        self
    }

    pub fn with_timestamp_window(mut self, window: u64) -> Self {
        self.timestamp_window = window;
        self
    }
}

/// Check kind, freshness, and the URL/method/payload binding of a credential.
///
/// Signature verification is separate ([`native::verify_event`]).
pub fn validate_http_auth_event(
    event: &Event,
    params: &ValidationParams,
) -> Result<HttpAuth, AuthError> {
    if event.kind != KIND_HTTP_AUTH {
        return Err(mismatch("kind", KIND_HTTP_AUTH, event.kind));
    }

    let skew = params.now.abs_diff(event.created_at);
    if skew > params.timestamp_window {
        return Err(mismatch("created_at", params.now, event.created_at));
    }

    let auth = HttpAuth::from_tags(&event.tags)?;
    if auth.url != params.url {
        return Err(mismatch("u", &params.url, &auth.url));
    }
    if auth.method != params.method {
        return Err(mismatch("method", params.method, auth.method));
    }

    if let Some(expected) = &params.payload_hash {
        match &auth.payload_hash {
            Some(actual) if actual.eq_ignore_ascii_case(expected) => {}
            Some(actual) => return Err(mismatch("payload", expected, actual)),
            None => return Err(AuthError::MissingTag("payload")),
        }
    }

    Ok(auth)
}

fn mismatch(
    field: &'static str,
    expected: impl std::fmt::Display,
    actual: impl std::fmt::Display,
) -> AuthError {
    AuthError::Mismatch {
        field,
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
