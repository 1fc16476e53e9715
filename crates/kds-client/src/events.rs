//! Push channel for kitchen clients.
//!
//! The server notifies kitchens over a WebSocket. Every decoded event is a
//! resync signal, never a state delta, so the listener stays dumb on purpose:
//! decode, forward, and own reconnection. A dropped connection flips the
//! board offline, waits out a fixed delay and dials again.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use kds_types::domain::event::KitchenEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Client-side view of the channel, for the header indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Online,
    Offline,
}

pub struct EventChannel {
    url: String,
    reconnect_delay: Duration,
}

impl EventChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: Duration::from_secs(2),
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Spawn the listener. Events and status transitions arrive on the two
    /// receivers; aborting the handle is the teardown path, and dropping
    /// both receivers ends the task on its next send.
    pub fn start(
        self,
    ) -> (
        mpsc::Receiver<KitchenEvent>,
        mpsc::Receiver<ChannelStatus>,
        JoinHandle<()>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (status_tx, status_rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move {
            self.run(event_tx, status_tx).await;
        });
        (event_rx, status_rx, handle)
    }

    async fn run(self, events: mpsc::Sender<KitchenEvent>, status: mpsc::Sender<ChannelStatus>) {
        loop {
            match connect_async(self.url.as_str()).await {
                Ok((mut stream, _)) => {
                    tracing::info!(url = %self.url, "kitchen channel connected");
                    if status.send(ChannelStatus::Online).await.is_err() {
                        return;
                    }
                    while let Some(frame) = stream.next().await {
                        match frame {
                            Ok(Message::Text(text)) => match parse_event(&text) {
                                Some(event) => {
                                    if events.send(event).await.is_err() {
                                        return;
                                    }
                                }
                                None => {
                                    tracing::debug!(frame = %text, "ignoring unknown channel frame");
                                }
                            },
                            Ok(Message::Ping(payload)) => {
                                if stream.send(Message::Pong(payload)).await.is_err() {
                                    break;
                                }
                            }
                            Ok(Message::Close(_)) | Err(_) => break,
                            Ok(_) => {}
                        }
                    }
                    tracing::warn!(url = %self.url, "kitchen channel dropped");
                }
                Err(err) => {
                    tracing::warn!(url = %self.url, error = %err, "kitchen channel connect failed");
                }
            }
            if status.send(ChannelStatus::Offline).await.is_err() {
                return;
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }
}

/// Decode one text frame. Unknown event kinds are skipped rather than
/// errored: payloads are only refetch signals, and new kinds the server
/// grows must not break older boards.
pub fn parse_event(text: &str) -> Option<KitchenEvent> {
    serde_json::from_str(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kds_types::domain::order::OrderStatus;

    #[test]
    fn parses_the_three_known_events() {
        assert_eq!(
            parse_event(r#"{"event":"connected"}"#),
            Some(KitchenEvent::Connected)
        );
        assert!(matches!(
            parse_event(r#"{"event":"new-order","order_id":"3f6f2a9e-54f4-4d11-a0a4-51f9e1f1a001"}"#),
            Some(KitchenEvent::NewOrder { order_id: Some(_) })
        ));
        assert!(matches!(
            parse_event(r#"{"event":"order-status-updated","status":"ready"}"#),
            Some(KitchenEvent::OrderStatusUpdated {
                status: Some(OrderStatus::Ready),
                ..
            })
        ));
    }

    #[test]
    fn unknown_or_malformed_frames_are_skipped() {
        assert_eq!(parse_event(r#"{"event":"menu-changed"}"#), None);
        assert_eq!(parse_event("not json"), None);
        assert_eq!(parse_event(""), None);
    }
}
