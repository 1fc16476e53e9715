use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::order::{Order, OrderStatus};
use super::timing::is_overdue;

/// The three columns of the kitchen board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Received,
    Preparing,
    Ready,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Received, Lane::Preparing, Lane::Ready];

    /// Which lane a status lands in, if any. Served, completed and rejected
    /// orders have left the board entirely.
    pub fn of(status: OrderStatus) -> Option<Lane> {
        match status {
            OrderStatus::Pending | OrderStatus::Accepted => Some(Lane::Received),
            OrderStatus::Preparing => Some(Lane::Preparing),
            OrderStatus::Ready => Some(Lane::Ready),
            OrderStatus::Served | OrderStatus::Completed | OrderStatus::Rejected => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Lane::Received => "Received",
            Lane::Preparing => "Preparing",
            Lane::Ready => "Ready",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Lane::Received => 0,
            Lane::Preparing => 1,
            Lane::Ready => 2,
        }
    }
}

/// One classified snapshot of the board. Rebuilt wholesale on every resync;
/// nothing is ever patched in place.
#[derive(Debug, Clone, Default)]
pub struct LaneBoard {
    pub received: Vec<Order>,
    pub preparing: Vec<Order>,
    pub ready: Vec<Order>,
}

impl LaneBoard {
    /// Partition a flat order list into lanes, oldest ticket first in each.
    pub fn classify(mut orders: Vec<Order>) -> Self {
        // Stable sort: orders created in the same instant keep server order.
        orders.sort_by_key(|o| o.created_at);
        let mut board = LaneBoard::default();
        for order in orders {
            match Lane::of(order.status) {
                Some(Lane::Received) => board.received.push(order),
                Some(Lane::Preparing) => board.preparing.push(order),
                Some(Lane::Ready) => board.ready.push(order),
                None => {}
            }
        }
        board
    }

    pub fn lane(&self, lane: Lane) -> &[Order] {
        match lane {
            Lane::Received => &self.received,
            Lane::Preparing => &self.preparing,
            Lane::Ready => &self.ready,
        }
    }

    pub fn total(&self) -> usize {
        self.received.len() + self.preparing.len() + self.ready.len()
    }

    /// Ids of tickets still waiting for acceptance. Drives the new-order cue.
    pub fn pending_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.received
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .map(|o| o.id)
    }

    /// Cards already in the red, across all lanes.
    pub fn overdue_count(&self, now: DateTime<Utc>) -> usize {
        self.received
            .iter()
            .chain(&self.preparing)
            .chain(&self.ready)
            .filter(|o| is_overdue(o, now))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::TableRef;
    use chrono::Duration;

    fn order(status: OrderStatus, age_secs: i64) -> Order {
        Order {
            id: Uuid::new_v4(),
            number: 1,
            status,
            created_at: Utc::now() - Duration::seconds(age_secs),
            table: TableRef {
                id: Uuid::new_v4(),
                label: "T1".into(),
            },
            items: vec![],
            total_cents: 0,
        }
    }

    #[test]
    fn every_status_maps_to_at_most_one_lane() {
        assert_eq!(Lane::of(OrderStatus::Pending), Some(Lane::Received));
        assert_eq!(Lane::of(OrderStatus::Accepted), Some(Lane::Received));
        assert_eq!(Lane::of(OrderStatus::Preparing), Some(Lane::Preparing));
        assert_eq!(Lane::of(OrderStatus::Ready), Some(Lane::Ready));
        assert_eq!(Lane::of(OrderStatus::Served), None);
        assert_eq!(Lane::of(OrderStatus::Completed), None);
        assert_eq!(Lane::of(OrderStatus::Rejected), None);
    }

    #[test]
    fn classify_places_each_open_order_exactly_once() {
        let orders = vec![
            order(OrderStatus::Pending, 30),
            order(OrderStatus::Accepted, 90),
            order(OrderStatus::Preparing, 200),
            order(OrderStatus::Ready, 500),
            order(OrderStatus::Served, 700),
            order(OrderStatus::Completed, 900),
            order(OrderStatus::Rejected, 10),
        ];
        let board = LaneBoard::classify(orders);
        assert_eq!(board.received.len(), 2);
        assert_eq!(board.preparing.len(), 1);
        assert_eq!(board.ready.len(), 1);
        assert_eq!(board.total(), 4);
    }

    #[test]
    fn lanes_sort_oldest_first() {
        let newer = order(OrderStatus::Accepted, 10);
        let older = order(OrderStatus::Accepted, 600);
        let board = LaneBoard::classify(vec![newer.clone(), older.clone()]);
        assert_eq!(board.received[0].id, older.id);
        assert_eq!(board.received[1].id, newer.id);
    }

    #[test]
    fn equal_timestamps_keep_server_order() {
        let stamp = Utc::now();
        let mut a = order(OrderStatus::Preparing, 0);
        let mut b = order(OrderStatus::Preparing, 0);
        a.created_at = stamp;
        b.created_at = stamp;
        let board = LaneBoard::classify(vec![a.clone(), b.clone()]);
        assert_eq!(board.preparing[0].id, a.id);
        assert_eq!(board.preparing[1].id, b.id);
    }

    #[test]
    fn pending_ids_exclude_accepted() {
        let pending = order(OrderStatus::Pending, 5);
        let accepted = order(OrderStatus::Accepted, 5);
        let board = LaneBoard::classify(vec![pending.clone(), accepted]);
        let ids: Vec<Uuid> = board.pending_ids().collect();
        assert_eq!(ids, vec![pending.id]);
    }

    #[test]
    fn overdue_count_spans_all_lanes() {
        let now = Utc::now();
        let orders = vec![
            order(OrderStatus::Accepted, 16 * 60),
            order(OrderStatus::Preparing, 20 * 60),
            order(OrderStatus::Ready, 60),
        ];
        let board = LaneBoard::classify(orders);
        assert_eq!(board.overdue_count(now), 2);
    }
}
