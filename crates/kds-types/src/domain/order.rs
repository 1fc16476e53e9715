use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an order as the API reports it. The board only ever asks the
/// server for forward moves; the full set exists so any payload deserializes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Preparing,
    Ready,
    Served,
    Completed,
    Rejected,
}

impl OrderStatus {
    /// Statuses that still belong on the kitchen board.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending
                | OrderStatus::Accepted
                | OrderStatus::Preparing
                | OrderStatus::Ready
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Completed => "completed",
            OrderStatus::Rejected => "rejected",
        }
    }
}

/// Per-line prep state. Servers keep adding values here, so unknown strings
/// fold into `Other` instead of failing the whole order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Queued,
    Preparing,
    Ready,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableRef {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub number: u32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub table: TableRef,
    pub items: Vec<OrderItem>,
    pub total_cents: i64,
}

impl Order {
    /// A freshly filed ticket: pending, stamped now.
    pub fn new(number: u32, table: TableRef, items: Vec<OrderItem>, total_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            table,
            items,
            total_cents,
        }
    }

    pub fn update_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|it| it.qty).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableRef {
        TableRef {
            id: Uuid::new_v4(),
            label: "T4".into(),
        }
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"preparing\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"ready\"").unwrap();
        assert_eq!(parsed, OrderStatus::Ready);
    }

    #[test]
    fn unknown_order_status_is_an_error() {
        let parsed = serde_json::from_str::<OrderStatus>("\"microwaved\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn unknown_item_status_folds_into_other() {
        let parsed: ItemStatus = serde_json::from_str("\"plated\"").unwrap();
        assert_eq!(parsed, ItemStatus::Other);
    }

    #[test]
    fn order_payload_deserializes_with_optional_item_fields() {
        let payload = r#"{
            "id": "4b4e6d9e-9d52-4b0e-8f3f-0f3a5a2f9b11",
            "number": 42,
            "status": "accepted",
            "created_at": "2026-08-23T11:30:00Z",
            "table": { "id": "0d2f7a37-f9d1-4f5e-a3e6-74d9c2b5ce01", "label": "T7" },
            "items": [
                { "name": "Carbonara", "qty": 2, "modifiers": ["no onion"] },
                { "name": "Tiramisu", "qty": 1, "status": "queued", "note": "birthday" }
            ],
            "total_cents": 3500
        }"#;
        let order: Order = serde_json::from_str(payload).unwrap();
        assert_eq!(order.number, 42);
        assert_eq!(order.status, OrderStatus::Accepted);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].status, None);
        assert_eq!(order.items[1].status, Some(ItemStatus::Queued));
        assert_eq!(order.items[1].note.as_deref(), Some("birthday"));
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn new_order_starts_pending() {
        let order = Order::new(
            7,
            table(),
            vec![OrderItem {
                name: "Soup".into(),
                qty: 1,
                status: None,
                modifiers: None,
                note: None,
            }],
            650,
        );
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.status.is_open());
        assert!(!OrderStatus::Served.is_open());
    }
}
