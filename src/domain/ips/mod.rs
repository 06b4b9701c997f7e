//! Blocked IP addresses.

#[cfg(feature = "http")]
pub mod client;

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// One row of `listblockedips`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpEntry {
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Parse an IPv4 or IPv6 address, returning its canonical text form.
pub fn normalize_ip(input: &str) -> Result<String, ValidationError> {
    input
        .trim()
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| ValidationError::InvalidIp(input.to_string()))
}
