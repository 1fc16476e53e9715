use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::OrderStatus;

/// Events pushed on the kitchen channel.
///
/// Payload fields are advisory only. The board treats every event as a
/// resync signal and never applies them as state deltas, so a missing or
/// extra field can never desynchronize it from the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum KitchenEvent {
    /// Greeting the channel sends once it has joined the client to the
    /// kitchen room.
    Connected,
    NewOrder {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        order_id: Option<Uuid>,
    },
    OrderStatusUpdated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        order_id: Option<Uuid>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<OrderStatus>,
    },
}
