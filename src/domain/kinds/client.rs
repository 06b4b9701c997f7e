//! Kinds sub-client.

use serde_json::json;

use crate::client::RelayAdminClient;
use crate::error::AdminError;
use crate::rpc::Method;

/// Sub-client for the allowed-kinds list.
pub struct Kinds<'a> {
    pub(crate) client: &'a RelayAdminClient,
}

impl<'a> Kinds<'a> {
    pub async fn allow(&self, kind: u16) -> Result<(), AdminError> {
        self.client
            .rpc()
            .call_method(Method::AllowKind, vec![json!(kind)])
            .await?;
        Ok(())
    }

    pub async fn disallow(&self, kind: u16) -> Result<(), AdminError> {
        self.client
            .rpc()
            .call_method(Method::DisallowKind, vec![json!(kind)])
            .await?;
        Ok(())
    }

    pub async fn list_allowed(&self) -> Result<Vec<u16>, AdminError> {
        let kinds: Option<Vec<u16>> = self
            .client
            .rpc()
            .call_as(Method::ListAllowedKinds, vec![])
            .await?;
        Ok(kinds.unwrap_or_default())
    }
}
