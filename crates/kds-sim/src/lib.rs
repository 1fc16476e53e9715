//! kds-sim: an in-process kitchen that behaves like the orders API.
//!
//! Demo mode runs the board against it instead of the network stack, and the
//! board's tests use it as their in-memory double. It keeps orders in a
//! concurrent map, broadcasts the same events the push channel would carry,
//! and can drive itself with randomized restaurant traffic.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use kds_types::domain::event::KitchenEvent;
use kds_types::domain::order::{Order, OrderItem, OrderStatus, TableRef};
use kds_types::ports::order_source::{OrderSource, SourceError};
use rand::Rng;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

const MENU: &[(&str, i64)] = &[
    ("Margherita", 1250),
    ("Carbonara", 1400),
    ("Caesar Salad", 950),
    ("Tomato Soup", 650),
    ("Ribeye", 2900),
    ("Tiramisu", 700),
];

const MODIFIERS: &[&str] = &["extra cheese", "no onion", "gluten free", "spicy"];

/// Seconds a ticket sits pending before the fake back office accepts it.
const ACCEPT_AFTER_SECS: i64 = 15;
/// Seconds after filing before a ready order gets handed off.
const SERVE_AFTER_SECS: i64 = 150;
/// Closed orders linger this long before the map forgets them.
const FORGET_AFTER_SECS: i64 = 300;

#[derive(Clone)]
pub struct SimKitchen {
    orders: Arc<DashMap<Uuid, Order>>,
    next_number: Arc<AtomicU32>,
    events: broadcast::Sender<KitchenEvent>,
}

impl SimKitchen {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            orders: Arc::new(DashMap::new()),
            next_number: Arc::new(AtomicU32::new(1)),
            events,
        }
    }

    /// Listen to the events the kitchen emits, the in-process stand-in for
    /// the push channel.
    pub fn subscribe(&self) -> broadcast::Receiver<KitchenEvent> {
        self.events.subscribe()
    }

    /// Put an exact order on the books without emitting an event. Seeding
    /// hook for tests and demos.
    pub fn seed(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    /// File a brand-new pending ticket, as the ordering flow would.
    pub fn file_order(&self) -> Order {
        let mut rng = rand::thread_rng();
        let table = TableRef {
            id: Uuid::new_v4(),
            label: format!("T{}", rng.gen_range(1..=20)),
        };
        let mut total = 0i64;
        let count = rng.gen_range(1..=3);
        let items: Vec<OrderItem> = (0..count)
            .map(|_| {
                let (name, price) = MENU[rng.gen_range(0..MENU.len())];
                let qty: u32 = rng.gen_range(1..=2);
                total += price * qty as i64;
                let modifiers = if rng.gen_bool(0.3) {
                    Some(vec![MODIFIERS[rng.gen_range(0..MODIFIERS.len())].to_string()])
                } else {
                    None
                };
                OrderItem {
                    name: name.to_string(),
                    qty,
                    status: None,
                    modifiers,
                    note: None,
                }
            })
            .collect();

        let number = self.next_number.fetch_add(1, Ordering::Relaxed);
        let order = Order::new(number, table, items, total);
        self.orders.insert(order.id, order.clone());
        let _ = self.events.send(KitchenEvent::NewOrder {
            order_id: Some(order.id),
        });
        tracing::debug!(order = %order.id, number, "sim filed order");
        order
    }

    /// Drive the fake restaurant: file new tickets, accept pending ones
    /// after a beat, hand off ready ones, and forget long-closed orders so
    /// the map stays bounded. One call per `pace`.
    pub fn spawn_service(&self, pace: Duration) -> JoinHandle<()> {
        let kitchen = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(pace).await;
                kitchen.tick();
            }
        })
    }

    /// One beat of restaurant activity.
    fn tick(&self) {
        {
            let mut rng = rand::thread_rng();
            if self.orders.len() < 12 && rng.gen_bool(0.7) {
                self.file_order();
            }
        }

        let now = Utc::now();
        let mut accept = Vec::new();
        let mut serve = Vec::new();
        let mut forget = Vec::new();
        for kv in self.orders.iter() {
            let age = (now - kv.created_at).num_seconds();
            match kv.status {
                OrderStatus::Pending if age >= ACCEPT_AFTER_SECS => accept.push(kv.id),
                OrderStatus::Ready if age >= SERVE_AFTER_SECS => serve.push(kv.id),
                OrderStatus::Served | OrderStatus::Completed | OrderStatus::Rejected
                    if age >= FORGET_AFTER_SECS =>
                {
                    forget.push(kv.id)
                }
                _ => {}
            }
        }
        for id in accept {
            self.transition(id, OrderStatus::Accepted);
        }
        for id in serve {
            self.transition(id, OrderStatus::Served);
        }
        for id in forget {
            self.orders.remove(&id);
        }
    }

    fn transition(&self, id: Uuid, status: OrderStatus) {
        let changed = match self.orders.get_mut(&id) {
            Some(mut entry) => {
                entry.update_status(status);
                true
            }
            None => false,
        };
        if changed {
            let _ = self.events.send(KitchenEvent::OrderStatusUpdated {
                order_id: Some(id),
                status: Some(status),
            });
        }
    }
}

impl Default for SimKitchen {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderSource for SimKitchen {
    async fn fetch_orders(&self, limit: usize) -> Result<Vec<Order>, SourceError> {
        let mut orders: Vec<Order> = self.orders.iter().map(|kv| kv.value().clone()).collect();
        // Oldest first; the page cap mirrors the API's limit parameter.
        orders.sort_by_key(|o| o.created_at);
        orders.truncate(limit);
        Ok(orders)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, SourceError> {
        let updated = match self.orders.get_mut(&id) {
            Some(mut entry) => {
                entry.update_status(status);
                entry.clone()
            }
            None => return Err(SourceError::Rejected(format!("unknown order {id}"))),
        };
        let _ = self.events.send(KitchenEvent::OrderStatusUpdated {
            order_id: Some(id),
            status: Some(status),
        });
        Ok(updated)
    }
}
