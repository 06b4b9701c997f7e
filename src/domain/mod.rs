//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Domain and wire types (the relay's JSON maps onto them directly)
//! - `state.rs` — Cached state with update methods, where the client keeps any
//! - `client.rs` — Sub-client with the NIP-86 calls for that slice
//!
//! `metadata` is the exception: it has no relay-management calls and owns a
//! standalone cache instead of a sub-client.

pub mod events;
pub mod ips;
pub mod kinds;
pub mod metadata;
pub mod pubkeys;
pub mod relay;
