//! IPs sub-client.

use serde_json::json;

use crate::client::RelayAdminClient;
use crate::domain::ips::{normalize_ip, IpEntry};
use crate::error::AdminError;
use crate::rpc::Method;
use crate::shared::non_blank;

/// Sub-client for the IP block list.
pub struct Ips<'a> {
    pub(crate) client: &'a RelayAdminClient,
}

impl<'a> Ips<'a> {
    pub async fn block(&self, ip: &str, reason: Option<&str>) -> Result<(), AdminError> {
        let ip = normalize_ip(ip)?;
        let mut params = vec![json!(ip)];
        if let Some(reason) = non_blank(reason) {
            params.push(json!(reason.trim()));
        }
        self.client.rpc().call_method(Method::BlockIp, params).await?;
        Ok(())
    }

    pub async fn unblock(&self, ip: &str) -> Result<(), AdminError> {
        let ip = normalize_ip(ip)?;
        self.client
            .rpc()
            .call_method(Method::UnblockIp, vec![json!(ip)])
            .await?;
        Ok(())
    }

    pub async fn list_blocked(&self) -> Result<Vec<IpEntry>, AdminError> {
        let entries: Option<Vec<IpEntry>> = self
            .client
            .rpc()
            .call_as(Method::ListBlockedIps, vec![])
            .await?;
        Ok(entries.unwrap_or_default())
    }
}
