//! NIP-86 relay management: method registry and request/response envelopes.

#[cfg(feature = "http")]
pub mod client;

use serde::{Deserialize, Serialize};

/// Known NIP-86 methods.
///
/// [`client::Rpc::call`] takes the method name as a string, so verbs missing
/// here are still sent unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    SupportedMethods,
    BanPubkey,
    ListBannedPubkeys,
    AllowPubkey,
    ListAllowedPubkeys,
    ListEventsNeedingModeration,
    AllowEvent,
    BanEvent,
    ListBannedEvents,
    ChangeRelayName,
    ChangeRelayDescription,
    ChangeRelayIcon,
    AllowKind,
    DisallowKind,
    ListAllowedKinds,
    BlockIp,
    UnblockIp,
    ListBlockedIps,
}

impl Method {
    pub const ALL: [Method; 18] = [
        Method::SupportedMethods,
        Method::BanPubkey,
        Method::ListBannedPubkeys,
        Method::AllowPubkey,
        Method::ListAllowedPubkeys,
        Method::ListEventsNeedingModeration,
        Method::AllowEvent,
        Method::BanEvent,
        Method::ListBannedEvents,
        Method::ChangeRelayName,
        Method::ChangeRelayDescription,
        Method::ChangeRelayIcon,
        Method::AllowKind,
        Method::DisallowKind,
        Method::ListAllowedKinds,
        Method::BlockIp,
        Method::UnblockIp,
        Method::ListBlockedIps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::SupportedMethods => "supportedmethods",
            Method::BanPubkey => "banpubkey",
            Method::ListBannedPubkeys => "listbannedpubkeys",
            Method::AllowPubkey => "allowpubkey",
            Method::ListAllowedPubkeys => "listallowedpubkeys",
            Method::ListEventsNeedingModeration => "listeventsneedingmoderation",
            Method::AllowEvent => "allowevent",
            Method::BanEvent => "banevent",
            Method::ListBannedEvents => "listbannedevents",
            Method::ChangeRelayName => "changerelayname",
            Method::ChangeRelayDescription => "changerelaydescription",
            Method::ChangeRelayIcon => "changerelayicon",
            Method::AllowKind => "allowkind",
            Method::DisallowKind => "disallowkind",
            Method::ListAllowedKinds => "listallowedkinds",
            Method::BlockIp => "blockip",
            Method::UnblockIp => "unblockip",
            Method::ListBlockedIps => "listblockedips",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == name)
    }

    /// Whether the method changes relay state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Method::SupportedMethods
                | Method::ListBannedPubkeys
                | Method::ListAllowedPubkeys
                | Method::ListEventsNeedingModeration
                | Method::ListBannedEvents
                | Method::ListAllowedKinds
                | Method::ListBlockedIps
        )
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body: `{"method": ..., "params": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<serde_json::Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<serde_json::Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// The exact bytes that are hashed and sent.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Response body: `{"result": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RpcResponse {
    /// `error` wins over `result`; a missing result is `null`.
    pub fn into_result(self) -> Result<serde_json::Value, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self.result.unwrap_or(serde_json::Value::Null)),
        }
    }
}
