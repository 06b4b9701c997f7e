//! Auth sub-client — signer access and per-request credentials.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{select, Either};

use crate::auth::{
    encode_authorization_header, payload_digest, unix_now, HttpAuth, HttpMethod, Signer,
};
use crate::client::RelayAdminClient;
use crate::error::AuthError;
use crate::event::Event;

/// Sub-client for the signing capability.
pub struct Auth<'a> {
    pub(crate) client: &'a RelayAdminClient,
}

impl<'a> Auth<'a> {
    /// Whether a signing capability is currently installed.
    pub async fn has_signer(&self) -> bool {
        self.client.signer.read().await.is_some()
    }

    /// Public key of the installed signer.
    pub async fn public_key(&self) -> Result<String, AuthError> {
        let signer = self.signer().await?;
        with_timeout(self.client.signer_timeout, signer.public_key()).await
    }

    /// Build and sign a fresh credential bound to `url`, `method` and `body`.
    ///
    /// The payload tag is always present; an empty body hashes to the
    /// SHA-256 of zero bytes.
    pub async fn sign_request(
        &self,
        url: &str,
        method: HttpMethod,
        body: &[u8],
    ) -> Result<Event, AuthError> {
        let signer = self.signer().await?;
        let timeout = self.client.signer_timeout;

        let pubkey = with_timeout(timeout, signer.public_key()).await?;
        let unsigned = HttpAuth::new(url, method)
            .with_payload_hash(payload_digest(body))
            .to_unsigned_event(pubkey, unix_now());

        let signed = with_timeout(timeout, signer.sign_event(unsigned)).await?;
        tracing::debug!(url, method = method.as_str(), id = %signed.id, "Signed HTTP auth event");
        Ok(signed)
    }

    /// `Authorization` header value for the request.
    pub async fn authorization_header(
        &self,
        url: &str,
        method: HttpMethod,
        body: &[u8],
    ) -> Result<String, AuthError> {
        let event = self.sign_request(url, method, body).await?;
        encode_authorization_header(&event)
    }

    async fn signer(&self) -> Result<Arc<dyn Signer>, AuthError> {
        self.client
            .signer
            .read()
            .await
            .clone()
            .ok_or(AuthError::CapabilityUnavailable)
    }
}

/// Bound a signer call; signers may wait on a human.
async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    futures_util::pin_mut!(fut);
    let delay = futures_timer::Delay::new(timeout);
    match select(fut, delay).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "Signer timed out");
            Err(AuthError::Timeout(timeout.as_secs()))
        }
    }
}
