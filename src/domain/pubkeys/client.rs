//! Pubkeys sub-client — list, allow, ban.

use serde_json::{json, Value};

use crate::client::{OperationGuard, RelayAdminClient, RelaySelection};
use crate::domain::pubkeys::state::{NoticeKind, PubkeyListState};
use crate::domain::pubkeys::{PubkeyEntry, PubkeyList};
use crate::error::AdminError;
use crate::rpc::client::decode_result;
use crate::rpc::Method;
use crate::shared::{non_blank, PubkeyHex};

/// Sub-client for the allowed/banned pubkey lists.
///
/// Every call is pinned to the relay selected when it started. If the
/// selection changes before the relay answers, nothing is written to the
/// list state: list calls fail with [`AdminError::RelayChanged`], and a
/// mutation that already succeeded skips its notice and reload.
pub struct Pubkeys<'a> {
    pub(crate) client: &'a RelayAdminClient,
}

impl<'a> Pubkeys<'a> {
    /// Fetch the allowed list and store it in the list state.
    pub async fn list_allowed(&self) -> Result<Vec<PubkeyEntry>, AdminError> {
        let selection = self.client.relay_selection().await;
        self.load(&selection, PubkeyList::Allowed).await
    }

    /// Fetch the banned list and store it in the list state.
    pub async fn list_banned(&self) -> Result<Vec<PubkeyEntry>, AdminError> {
        let selection = self.client.relay_selection().await;
        self.load(&selection, PubkeyList::Banned).await
    }

    /// Reload both lists, allowed first.
    pub async fn reload(&self) -> Result<(), AdminError> {
        let selection = self.client.relay_selection().await;
        self.reload_from(&selection).await
    }

    /// Add `pubkey` to the allow list, then reload both lists.
    pub async fn allow(&self, pubkey: &str, reason: Option<&str>) -> Result<(), AdminError> {
        self.mutate(PubkeyList::Allowed, pubkey, reason).await
    }

    /// Ban `pubkey`, then reload both lists.
    pub async fn ban(&self, pubkey: &str, reason: Option<&str>) -> Result<(), AdminError> {
        self.mutate(PubkeyList::Banned, pubkey, reason).await
    }

    /// Snapshot of the current list state.
    pub async fn state(&self) -> PubkeyListState {
        self.client.pubkey_state.read().await.clone()
    }

    /// Whether a mutation is in flight.
    pub fn is_operating(&self) -> bool {
        self.client.is_operating()
    }

    async fn reload_from(&self, selection: &RelaySelection) -> Result<(), AdminError> {
        self.load(selection, PubkeyList::Allowed).await?;
        self.load(selection, PubkeyList::Banned).await?;
        Ok(())
    }

    async fn load(
        &self,
        selection: &RelaySelection,
        list: PubkeyList,
    ) -> Result<Vec<PubkeyEntry>, AdminError> {
        let relay = selection.url.as_ref().ok_or(AdminError::RelayNotSet)?;
        let method = match list {
            PubkeyList::Allowed => Method::ListAllowedPubkeys,
            PubkeyList::Banned => Method::ListBannedPubkeys,
        };

        let value = self
            .client
            .rpc()
            .call_relay(relay, method.as_str(), vec![])
            .await?;
        let entries: Option<Vec<PubkeyEntry>> = decode_result(method, value)?;
        let entries = entries.unwrap_or_default();

        // Lock order: list state, then relay.
        let mut state = self.client.pubkey_state.write().await;
        if !self.client.is_current(selection.generation).await {
            tracing::debug!(method = method.as_str(), relay = %relay, "Discarding list from previous relay");
            return Err(AdminError::RelayChanged);
        }
        match list {
            PubkeyList::Allowed => state.replace_allowed(entries.clone()),
            PubkeyList::Banned => state.replace_banned(entries.clone()),
        }
        tracing::debug!(method = method.as_str(), count = entries.len(), "Loaded pubkey list");
        Ok(entries)
    }

    async fn mutate(
        &self,
        list: PubkeyList,
        pubkey: &str,
        reason: Option<&str>,
    ) -> Result<(), AdminError> {
        let selection = self.client.relay_selection().await;
        let pubkey = match PubkeyHex::parse(pubkey) {
            Ok(pk) => pk,
            Err(e) => return Err(self.fail(&selection, e.into()).await),
        };
        let Some(relay) = selection.url.as_ref() else {
            return Err(self.fail(&selection, AdminError::RelayNotSet).await);
        };

        let _guard = OperationGuard::acquire(&self.client.operating)?;

        let (method, done) = match list {
            PubkeyList::Allowed => (Method::AllowPubkey, "Pubkey allowed"),
            PubkeyList::Banned => (Method::BanPubkey, "Pubkey banned"),
        };
        let params = mutation_params(&pubkey, reason);

        tracing::debug!(method = method.as_str(), pubkey = %pubkey, "Updating pubkey list");
        if let Err(e) = self
            .client
            .rpc()
            .call_relay(relay, method.as_str(), params)
            .await
        {
            tracing::warn!(method = method.as_str(), pubkey = %pubkey, error = %e, "Pubkey update failed");
            return Err(self.fail(&selection, e).await);
        }

        if !self
            .notify(&selection, NoticeKind::Success, done.to_string())
            .await
        {
            tracing::debug!(relay = %relay, "Relay changed after update; skipping reload");
            return Ok(());
        }

        match self.reload_from(&selection).await {
            Ok(()) | Err(AdminError::RelayChanged) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "Reload after pubkey update failed");
                Err(self.fail(&selection, e).await)
            }
        }
    }

    async fn fail(&self, selection: &RelaySelection, error: AdminError) -> AdminError {
        self.notify(selection, NoticeKind::Error, error.user_message())
            .await;
        error
    }

    /// Set a notice unless the relay changed; returns whether it was set.
    async fn notify(&self, selection: &RelaySelection, kind: NoticeKind, text: String) -> bool {
        let mut state = self.client.pubkey_state.write().await;
        if !self.client.is_current(selection.generation).await {
            return false;
        }
        state.set_notice(kind, text, self.client.notice_ttl);
        true
    }
}

fn mutation_params(pubkey: &PubkeyHex, reason: Option<&str>) -> Vec<Value> {
    let mut params = vec![json!(pubkey.as_str())];
    if let Some(reason) = non_blank(reason) {
        params.push(json!(reason.trim()));
    }
    params
}
