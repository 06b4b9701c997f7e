//! Low-level HTTP client — `RelayHttp`.
//!
//! Two endpoints share one relay URL: NIP-86 management calls (`POST`) and the
//! NIP-11 information document (`GET`). Returns wire types; the RPC layer and
//! domain sub-clients interpret them.

use crate::domain::relay::RelayInfo;
use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::network::{RELAY_INFO_ACCEPT, RPC_CONTENT_TYPE};
use crate::rpc::RpcResponse;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Low-level HTTP client for relay endpoints.
#[derive(Clone)]
pub struct RelayHttp {
    client: Client,
}

/// A fully prepared request. The body bytes are sent exactly as given.
struct Outgoing<'a> {
    method: reqwest::Method,
    url: &'a str,
    headers: Vec<(reqwest::header::HeaderName, String)>,
    body: Option<&'a [u8]>,
}

impl RelayHttp {
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self { client })
    }

    // ── NIP-86 ───────────────────────────────────────────────────────────

    /// POST a management request. Never retried: mutations are not idempotent
    /// and every attempt would need a fresh credential.
    pub async fn post_rpc(
        &self,
        url: &str,
        body: &[u8],
        authorization: &str,
    ) -> Result<RpcResponse, HttpError> {
        let request = Outgoing {
            method: reqwest::Method::POST,
            url,
            headers: vec![
                (CONTENT_TYPE, RPC_CONTENT_TYPE.to_string()),
                (AUTHORIZATION, authorization.to_string()),
            ],
            body: Some(body),
        };
        self.request_with_retry(&request, RetryPolicy::None).await
    }

    // ── NIP-11 ───────────────────────────────────────────────────────────

    pub async fn get_relay_info(
        &self,
        url: &str,
        retry: RetryPolicy,
    ) -> Result<RelayInfo, HttpError> {
        let request = Outgoing {
            method: reqwest::Method::GET,
            url,
            headers: vec![(ACCEPT, RELAY_INFO_ACCEPT.to_string())],
            body: None,
        };
        self.request_with_retry(&request, retry).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn request_with_retry<T: DeserializeOwned>(
        &self,
        request: &Outgoing<'_>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match retry {
            RetryPolicy::None => return self.do_request(request).await,
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c,
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T>(request).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if config.should_retry(&e) && attempt < config.max_retries {
                        let delay = config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retrying request to {}",
                            request.url
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned>(
        &self,
        request: &Outgoing<'_>,
    ) -> Result<T, HttpError> {
        let mut req = self.client.request(request.method.clone(), request.url);
        for (name, value) in &request.headers {
            req = req.header(name, value);
        }
        if let Some(body) = request.body {
            req = req.body(body.to_vec());
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Reqwest(e)
            }
        })?;
        let status = resp.status();

        if !status.is_success() {
            tracing::debug!(
                url = request.url,
                status = status.as_u16(),
                "Relay returned non-success status"
            );
            return Err(HttpError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| HttpError::InvalidBody(e.to_string()))
    }
}
