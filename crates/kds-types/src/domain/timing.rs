use chrono::{DateTime, Utc};

use super::order::{Order, OrderStatus};

/// A card turns amber at ten minutes on the board.
pub const WARN_AFTER_MS: i64 = 10 * 60 * 1000;
/// And red at fifteen.
pub const OVERDUE_AFTER_MS: i64 = 15 * 60 * 1000;
/// A pending ticket counts as new for its first minute.
pub const NEW_FOR_MS: i64 = 60 * 1000;

/// Urgency of a ticket's time on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tone {
    Normal,
    Warning,
    Danger,
}

pub fn tone_for_elapsed(elapsed_ms: i64) -> Tone {
    if elapsed_ms >= OVERDUE_AFTER_MS {
        Tone::Danger
    } else if elapsed_ms >= WARN_AFTER_MS {
        Tone::Warning
    } else {
        Tone::Normal
    }
}

/// Milliseconds the order has been on the board, clamped at zero so a skewed
/// server clock never produces a negative age.
pub fn elapsed_ms(order: &Order, now: DateTime<Utc>) -> i64 {
    (now - order.created_at).num_milliseconds().max(0)
}

pub fn order_tone(order: &Order, now: DateTime<Utc>) -> Tone {
    tone_for_elapsed(elapsed_ms(order, now))
}

pub fn is_overdue(order: &Order, now: DateTime<Utc>) -> bool {
    order_tone(order, now) == Tone::Danger
}

/// True for pending tickets no older than a minute; drives the NEW badge.
pub fn is_new_pending(order: &Order, now: DateTime<Utc>) -> bool {
    order.status == OrderStatus::Pending && elapsed_ms(order, now) <= NEW_FOR_MS
}
