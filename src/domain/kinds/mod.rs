//! Allowed event kinds.
//!
//! Kind parameters are JSON numbers on the wire, unlike the string
//! parameters of the pubkey, event, and IP methods.

#[cfg(feature = "http")]
pub mod client;
