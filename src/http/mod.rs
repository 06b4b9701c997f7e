//! HTTP client layer — `RelayHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::RelayHttp;
pub use retry::{RetryConfig, RetryPolicy};
