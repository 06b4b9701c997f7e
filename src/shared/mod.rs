//! Shared newtypes and validation used across all domain modules.
//!
//! The key types validate on construction and serialize transparently as the
//! raw strings the relay exchanges, so they can sit directly in wire types.

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Whether `s` is exactly 64 hexadecimal characters (either case).
pub fn is_hex64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

// ─── PubkeyHex ───────────────────────────────────────────────────────────────

/// A Nostr public key as a 64-character hex string.
///
/// The original casing is kept; validation is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PubkeyHex(String);

impl PubkeyHex {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if is_hex64(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidPubkey(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PubkeyHex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PubkeyHex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PubkeyHex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PubkeyHex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PubkeyHex::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ─── EventIdHex ──────────────────────────────────────────────────────────────

/// A Nostr event id as a 64-character hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventIdHex(String);

impl EventIdHex {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if is_hex64(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidEventId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventIdHex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── RelayUrl ────────────────────────────────────────────────────────────────

/// A relay address with a `ws` or `wss` scheme.
///
/// The string the operator entered is kept for display and for WebSocket
/// connections; [`RelayUrl::http_url`] gives the HTTP-equivalent endpoint
/// used for NIP-11 and NIP-86.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelayUrl {
    raw: String,
    secure: bool,
    host: String,
}

impl RelayUrl {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::EmptyRelayUrl);
        }

        let parsed =
            url::Url::parse(raw).map_err(|e| ValidationError::InvalidRelayUrl(e.to_string()))?;

        let secure = match parsed.scheme() {
            "wss" => true,
            "ws" => false,
            other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
        };

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ValidationError::InvalidRelayUrl(format!("{} has no host", raw)))?;
        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        // `ws:host` parses as a special-scheme URL; fall back to the
        // normalized form so the HTTP conversion below stays a prefix swap.
        let raw = if raw.contains("://") {
            raw.to_string()
        } else {
            parsed.to_string()
        };

        Ok(Self { raw, secure, host })
    }

    /// The address as entered (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Host and optional port, for display.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `ws://` → `http://`, `wss://` → `https://`; the rest is kept byte-for-byte.
    pub fn http_url(&self) -> String {
        let rest = match self.raw.find("://") {
            Some(idx) => &self.raw[idx + 3..],
            None => self.raw.as_str(),
        };
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}", scheme, rest)
    }
}

impl std::fmt::Display for RelayUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for RelayUrl {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RelayUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for RelayUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RelayUrl::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Drop blank reasons so the relay never receives an empty string parameter.
pub(crate) fn non_blank(reason: Option<&str>) -> Option<&str> {
    reason.filter(|r| !r.trim().is_empty())
}
