//! WebSocket layer — NIP-01 relay messages and filters.
//!
//! The transport lives in `native.rs` behind the `ws-native` feature. This
//! module only defines the message types, so the metadata cache can be used
//! with any transport that yields [`Event`]s.

#[cfg(feature = "ws-native")]
pub mod native;

use crate::error::WsError;
use crate::event::Event;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Subscription filter. Only the fields this crate queries by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<u16>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author(mut self, pubkey: impl Into<String>) -> Self {
        self.authors.get_or_insert_with(Vec::new).push(pubkey.into());
        self
    }

    pub fn kind(mut self, kind: u16) -> Self {
        self.kinds.get_or_insert_with(Vec::new).push(kind);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `event` satisfies the id/author/kind constraints.
    pub fn matches(&self, event: &Event) -> bool {
        let within = |list: &Option<Vec<String>>, value: &str| {
            list.as_ref()
                .map_or(true, |l| l.iter().any(|v| v.eq_ignore_ascii_case(value)))
        };
        within(&self.ids, &event.id)
            && within(&self.authors, &event.pubkey)
            && self.kinds.as_ref().map_or(true, |k| k.contains(&event.kind))
    }
}

// ─── Outbound messages ───────────────────────────────────────────────────────

/// Messages sent from client to relay.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Req {
        subscription_id: String,
        filters: Vec<Filter>,
    },
    Close {
        subscription_id: String,
    },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let value = match self {
            ClientMessage::Req {
                subscription_id,
                filters,
            } => {
                let mut parts = vec![json!("REQ"), json!(subscription_id)];
                for filter in filters {
                    parts.push(serde_json::to_value(filter)?);
                }
                Value::Array(parts)
            }
            ClientMessage::Close { subscription_id } => json!(["CLOSE", subscription_id]),
        };
        serde_json::to_string(&value)
    }
}

// ─── Inbound messages ────────────────────────────────────────────────────────

/// Messages received from a relay.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    Event {
        subscription_id: String,
        event: Box<Event>,
    },
    Eose {
        subscription_id: String,
    },
    Closed {
        subscription_id: String,
        message: String,
    },
    Notice {
        message: String,
    },
    /// Anything this crate does not act on (`OK`, `AUTH`, `COUNT`, ...).
    Other(String),
}

impl RelayMessage {
    pub fn from_json(text: &str) -> Result<Self, WsError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| WsError::ProtocolError(format!("invalid JSON: {}", e)))?;
        let parts = value
            .as_array()
            .ok_or_else(|| WsError::ProtocolError("expected a JSON array".to_string()))?;
        let label = parts
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| WsError::ProtocolError("missing message label".to_string()))?;

        let text_at = |i: usize| -> Result<String, WsError> {
            parts
                .get(i)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| WsError::ProtocolError(format!("{} missing field {}", label, i)))
        };

        match label {
            "EVENT" => {
                let subscription_id = text_at(1)?;
                let raw = parts
                    .get(2)
                    .cloned()
                    .ok_or_else(|| WsError::ProtocolError("EVENT missing event".to_string()))?;
                let event: Event = serde_json::from_value(raw)
                    .map_err(|e| WsError::ProtocolError(format!("invalid event: {}", e)))?;
                Ok(RelayMessage::Event {
                    subscription_id,
                    event: Box::new(event),
                })
            }
            "EOSE" => Ok(RelayMessage::Eose {
                subscription_id: text_at(1)?,
            }),
            "CLOSED" => Ok(RelayMessage::Closed {
                subscription_id: text_at(1)?,
                message: text_at(2).unwrap_or_default(),
            }),
            "NOTICE" => Ok(RelayMessage::Notice {
                message: text_at(1).unwrap_or_default(),
            }),
            other => Ok(RelayMessage::Other(other.to_string())),
        }
    }
}
