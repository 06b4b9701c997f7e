//! RPC sub-client — one signed NIP-86 call per invocation.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{encode_authorization_header, HttpMethod};
use crate::client::RelayAdminClient;
use crate::error::AdminError;
use crate::rpc::{Method, RpcRequest};
use crate::shared::RelayUrl;

/// Sub-client for raw management calls.
pub struct Rpc<'a> {
    pub(crate) client: &'a RelayAdminClient,
}

impl<'a> Rpc<'a> {
    /// Send `method` with `params` to the configured relay.
    ///
    /// Returns `Ok(None)` without touching the network when no relay is set.
    /// The body is serialized once; the same bytes are hashed into the
    /// credential and sent. Exactly one HTTP request is made.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Option<Value>, AdminError> {
        let Some(relay) = self.client.relay_url().await else {
            tracing::debug!(method, "No relay configured; skipping call");
            return Ok(None);
        };
        self.call_relay(&relay, method, params).await.map(Some)
    }

    /// Send one signed call to `relay`, whatever relay is selected by then.
    pub(crate) async fn call_relay(
        &self,
        relay: &RelayUrl,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, AdminError> {
        let url = relay.http_url();

        let body = RpcRequest::new(method, params).to_bytes()?;
        let credential = self
            .client
            .auth()
            .sign_request(&url, HttpMethod::Post, &body)
            .await?;
        let authorization = encode_authorization_header(&credential)?;

        tracing::debug!(method, url = %url, bytes = body.len(), "Sending relay management call");
        let response = self
            .client
            .http
            .post_rpc(&url, &body, &authorization)
            .await?;

        response.into_result().map_err(|message| {
            tracing::debug!(method, error = %message, "Relay rejected call");
            AdminError::Rpc(message)
        })
    }

    /// Like [`Rpc::call`] for a known method, treating a missing relay as an error.
    pub async fn call_method(&self, method: Method, params: Vec<Value>) -> Result<Value, AdminError> {
        self.call(method.as_str(), params)
            .await?
            .ok_or(AdminError::RelayNotSet)
    }

    /// Call a known method and decode its result.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: Method,
        params: Vec<Value>,
    ) -> Result<T, AdminError> {
        let value = self.call_method(method, params).await?;
        decode_result(method, value)
    }
}

/// Decode a result value, naming the method on mismatch.
pub(crate) fn decode_result<T: DeserializeOwned>(method: Method, value: Value) -> Result<T, AdminError> {
    serde_json::from_value(value).map_err(|e| AdminError::UnexpectedResult {
        method: method.as_str().to_string(),
        reason: e.to_string(),
    })
}
