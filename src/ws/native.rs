//! Native WebSocket queries — `tokio-tungstenite`.
//!
//! One connection per query: `REQ`, collect `EVENT`s until `EOSE`, `CLOSE`,
//! disconnect. Enough for occasional profile lookups; no subscriptions are
//! kept open.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::WsError;
use crate::event::Event;
use crate::network::DEFAULT_QUERY_TIMEOUT;
use crate::shared::RelayUrl;
use crate::ws::{ClientMessage, Filter, RelayMessage};

/// One-shot query against a single relay.
#[derive(Debug, Clone)]
pub struct RelayQuery {
    url: String,
    timeout: Duration,
}

impl RelayQuery {
    pub fn new(relay: &RelayUrl) -> Self {
        Self {
            url: relay.as_str().to_string(),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Bound on the whole exchange, connect included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stored events matching `filter`, in the order the relay sent them.
    pub async fn fetch(&self, filter: Filter) -> Result<Vec<Event>, WsError> {
        match tokio::time::timeout(self.timeout, self.run(filter)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(url = %self.url, "Relay query timed out");
                Err(WsError::Timeout)
            }
        }
    }

    /// The newest matching event, if any.
    pub async fn fetch_latest(&self, filter: Filter) -> Result<Option<Event>, WsError> {
        let events = self.fetch(filter).await?;
        Ok(events.into_iter().max_by_key(|e| e.created_at))
    }

    async fn run(&self, filter: Filter) -> Result<Vec<Event>, WsError> {
        let (mut ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let subscription_id = new_subscription_id();
        let req = ClientMessage::Req {
            subscription_id: subscription_id.clone(),
            filters: vec![filter.clone()],
        };
        ws.send(Message::text(encode(&req)?))
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))?;

        let mut events = Vec::new();
        loop {
            let Some(frame) = ws.next().await else {
                return Err(WsError::Closed("connection ended before EOSE".to_string()));
            };
            let frame = frame.map_err(|e| WsError::ProtocolError(e.to_string()))?;

            let text = match frame {
                Message::Text(text) => text,
                Message::Close(_) => {
                    return Err(WsError::Closed("relay closed the connection".to_string()))
                }
                _ => continue,
            };

            match RelayMessage::from_json(text.as_str()) {
                Ok(RelayMessage::Event {
                    subscription_id: sub,
                    event,
                }) if sub == subscription_id => {
                    if filter.matches(&event) {
                        events.push(*event);
                    }
                }
                Ok(RelayMessage::Eose { subscription_id: sub }) if sub == subscription_id => break,
                Ok(RelayMessage::Closed {
                    subscription_id: sub,
                    message,
                }) if sub == subscription_id => return Err(WsError::Closed(message)),
                Ok(RelayMessage::Notice { message }) => {
                    tracing::debug!(url = %self.url, notice = %message, "Relay notice");
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(url = %self.url, error = %e, "Skipping relay message"),
            }
        }

        let close = ClientMessage::Close { subscription_id };
        if let Err(e) = ws.send(Message::text(encode(&close)?)).await {
            tracing::debug!(error = %e, "Failed to send CLOSE");
        }
        let _ = ws.close(None).await;

        Ok(events)
    }
}

fn encode(msg: &ClientMessage) -> Result<String, WsError> {
    msg.to_json()
        .map_err(|e| WsError::ProtocolError(e.to_string()))
}

fn new_subscription_id() -> String {
    hex::encode(rand::random::<[u8; 8]>())
}
