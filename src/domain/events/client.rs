//! Events sub-client — ban, allow, moderation queue.

use serde_json::{json, Value};

use crate::client::RelayAdminClient;
use crate::domain::events::EventEntry;
use crate::error::AdminError;
use crate::rpc::Method;
use crate::shared::{non_blank, EventIdHex};

/// Sub-client for event moderation.
pub struct Events<'a> {
    pub(crate) client: &'a RelayAdminClient,
}

impl<'a> Events<'a> {
    pub async fn ban(&self, id: &str, reason: Option<&str>) -> Result<(), AdminError> {
        self.moderate(Method::BanEvent, id, reason).await
    }

    /// Approve an event, e.g. one from the moderation queue.
    pub async fn allow(&self, id: &str, reason: Option<&str>) -> Result<(), AdminError> {
        self.moderate(Method::AllowEvent, id, reason).await
    }

    pub async fn list_banned(&self) -> Result<Vec<EventEntry>, AdminError> {
        self.list(Method::ListBannedEvents).await
    }

    pub async fn list_needing_moderation(&self) -> Result<Vec<EventEntry>, AdminError> {
        self.list(Method::ListEventsNeedingModeration).await
    }

    async fn list(&self, method: Method) -> Result<Vec<EventEntry>, AdminError> {
        let entries: Option<Vec<EventEntry>> = self.client.rpc().call_as(method, vec![]).await?;
        Ok(entries.unwrap_or_default())
    }

    async fn moderate(
        &self,
        method: Method,
        id: &str,
        reason: Option<&str>,
    ) -> Result<(), AdminError> {
        let id = EventIdHex::parse(id.trim())?;
        let mut params: Vec<Value> = vec![json!(id.as_str())];
        if let Some(reason) = non_blank(reason) {
            params.push(json!(reason.trim()));
        }
        self.client.rpc().call_method(method, params).await?;
        Ok(())
    }
}
