//! Relay sub-client — NIP-11 info, supported methods, name/description/icon.

use serde_json::json;

use crate::client::RelayAdminClient;
use crate::domain::relay::RelayInfo;
use crate::error::{AdminError, ValidationError};
use crate::http::RetryPolicy;
use crate::rpc::Method;
use crate::shared::RelayUrl;

/// Sub-client for relay-level operations.
pub struct Relay<'a> {
    pub(crate) client: &'a RelayAdminClient,
}

impl<'a> Relay<'a> {
    /// NIP-11 document of the configured relay.
    pub async fn info(&self) -> Result<RelayInfo, AdminError> {
        let relay = self.client.relay_url().await.ok_or(AdminError::RelayNotSet)?;
        self.fetch_info(&relay).await
    }

    /// NIP-11 document of any relay, e.g. to preview one before selecting it.
    /// Unauthenticated.
    pub async fn fetch_info(&self, relay: &RelayUrl) -> Result<RelayInfo, AdminError> {
        let url = relay.http_url();
        let info = self
            .client
            .http
            .get_relay_info(&url, RetryPolicy::Idempotent)
            .await?;
        tracing::debug!(url = %url, name = ?info.name, "Fetched relay info");
        Ok(info)
    }

    /// Method names the relay says it supports.
    pub async fn supported_methods(&self) -> Result<Vec<String>, AdminError> {
        let methods: Option<Vec<String>> = self
            .client
            .rpc()
            .call_as(Method::SupportedMethods, vec![])
            .await?;
        Ok(methods.unwrap_or_default())
    }

    pub async fn change_name(&self, name: &str) -> Result<(), AdminError> {
        self.change(Method::ChangeRelayName, "Relay name", name).await
    }

    pub async fn change_description(&self, description: &str) -> Result<(), AdminError> {
        self.change(Method::ChangeRelayDescription, "Relay description", description)
            .await
    }

    pub async fn change_icon(&self, icon_url: &str) -> Result<(), AdminError> {
        self.change(Method::ChangeRelayIcon, "Relay icon URL", icon_url)
            .await
    }

    async fn change(
        &self,
        method: Method,
        field: &'static str,
        value: &str,
    ) -> Result<(), AdminError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationError::Empty(field).into());
        }
        self.client
            .rpc()
            .call_method(method, vec![json!(value)])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_name_rejected_before_network() {
        let client = RelayAdminClient::builder()
            .relay_url("ws://127.0.0.1:9")
            .build()
            .unwrap();
        let err = client.relay().change_name("  ").await.unwrap_err();
        assert!(matches!(
            err,
            AdminError::Validation(ValidationError::Empty("Relay name"))
        ));
    }

    #[tokio::test]
    async fn test_info_requires_relay() {
        let client = RelayAdminClient::builder().build().unwrap();
        assert!(matches!(
            client.relay().info().await,
            Err(AdminError::RelayNotSet)
        ));
    }
}
