//! Where the metadata cache gets kind-0 events from.

use async_trait::async_trait;

use crate::error::AdminError;
use crate::event::Event;

/// Fetches the newest kind-0 event for an author.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// `Ok(None)` when the author has no profile event.
    async fn fetch_latest(&self, pubkey: &str) -> Result<Option<Event>, AdminError>;
}

#[cfg(feature = "ws-native")]
pub use relay::RelayMetadataSource;

#[cfg(feature = "ws-native")]
mod relay {
    use super::*;
    use crate::event::KIND_METADATA;
    use crate::shared::RelayUrl;
    use crate::ws::native::RelayQuery;
    use crate::ws::Filter;
    use std::time::Duration;

    /// Queries one relay over WebSocket:
    /// `{"kinds":[0],"authors":[pubkey],"limit":1}`.
    #[derive(Debug, Clone)]
    pub struct RelayMetadataSource {
        query: RelayQuery,
    }

    impl RelayMetadataSource {
        pub fn new(relay: &RelayUrl) -> Self {
            Self {
                query: RelayQuery::new(relay),
            }
        }

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.query = self.query.timeout(timeout);
            self
        }
    }

    #[async_trait]
    impl MetadataSource for RelayMetadataSource {
        async fn fetch_latest(&self, pubkey: &str) -> Result<Option<Event>, AdminError> {
            let filter = Filter::new().kind(KIND_METADATA).author(pubkey).limit(1);
            Ok(self.query.fetch_latest(filter).await?)
        }
    }
}
