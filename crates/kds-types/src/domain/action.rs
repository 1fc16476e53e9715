use super::lane::Lane;
use super::order::OrderStatus;

/// The single forward move a lane may offer on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneAction {
    StartCooking,
    MarkReady,
}

impl LaneAction {
    pub fn label(self) -> &'static str {
        match self {
            LaneAction::StartCooking => "Start Cooking",
            LaneAction::MarkReady => "Mark Ready",
        }
    }

    /// The status the action asks the server to move the order to.
    pub fn target(self) -> OrderStatus {
        match self {
            LaneAction::StartCooking => OrderStatus::Preparing,
            LaneAction::MarkReady => OrderStatus::Ready,
        }
    }
}

/// Lane plus current status to the one allowed action, or None when the card
/// is blocked. Moves only go forward and never skip the preparing step.
pub fn next_action(lane: Lane, status: OrderStatus) -> Option<LaneAction> {
    match (lane, status) {
        (Lane::Received, OrderStatus::Accepted) => Some(LaneAction::StartCooking),
        (Lane::Preparing, OrderStatus::Preparing) => Some(LaneAction::MarkReady),
        _ => None,
    }
}

/// Why a card offers no action, for the footer hint on a blocked key press.
pub fn blocked_reason(lane: Lane, status: OrderStatus) -> &'static str {
    match (lane, status) {
        (Lane::Received, OrderStatus::Pending) => "order is awaiting acceptance",
        (Lane::Ready, _) => "ready orders are handed off at the counter",
        _ => "no action available for this order",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_cards_offer_start_cooking() {
        let action = next_action(Lane::Received, OrderStatus::Accepted).unwrap();
        assert_eq!(action, LaneAction::StartCooking);
        assert_eq!(action.target(), OrderStatus::Preparing);
        assert_eq!(action.label(), "Start Cooking");
    }

    #[test]
    fn preparing_cards_offer_mark_ready() {
        let action = next_action(Lane::Preparing, OrderStatus::Preparing).unwrap();
        assert_eq!(action, LaneAction::MarkReady);
        assert_eq!(action.target(), OrderStatus::Ready);
        assert_eq!(action.label(), "Mark Ready");
    }

    #[test]
    fn pending_and_ready_cards_are_blocked() {
        assert_eq!(next_action(Lane::Received, OrderStatus::Pending), None);
        assert_eq!(next_action(Lane::Ready, OrderStatus::Ready), None);
        assert_eq!(
            blocked_reason(Lane::Received, OrderStatus::Pending),
            "order is awaiting acceptance"
        );
    }

    #[test]
    fn mismatched_lane_and_status_is_blocked() {
        // A resync can move a card out from under the cursor; the stale
        // combination must never produce an action.
        assert_eq!(next_action(Lane::Received, OrderStatus::Preparing), None);
        assert_eq!(next_action(Lane::Preparing, OrderStatus::Accepted), None);
        assert_eq!(next_action(Lane::Ready, OrderStatus::Preparing), None);
    }
}
