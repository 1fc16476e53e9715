use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kds_types::domain::action::{blocked_reason, next_action, LaneAction};
use kds_types::domain::lane::{Lane, LaneBoard};
use kds_types::ports::order_source::{OrderSource, SourceError};
use tokio::sync::{mpsc, Mutex, RwLock};
use uuid::Uuid;

use super::alerts::AlertTracker;
use crate::notice::Notice;

/// Why a resync was asked for. Logged only; every trigger funnels into the
/// same fetch-everything path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Startup,
    Push,
    Manual,
    PostAction,
}

/// What one resync changed, as far as the screen cares.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub total: usize,
    pub new_pending: Vec<Uuid>,
}

/// Everything the screen renders. Cloned out on each frame.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub lanes: LaneBoard,
    pub synced_at: Option<DateTime<Utc>>,
    pub online: bool,
    pub notice: Option<Notice>,
    /// New-ticket cues the screen has not played yet.
    pub pending_cues: usize,
}

/// The board core, generic over where orders come from. Holds the only copy
/// of board state; adapters read snapshots and ask for resyncs.
pub struct BoardService<S: OrderSource> {
    source: S,
    page_limit: usize,
    state: RwLock<BoardState>,
    alerts: Mutex<AlertTracker>,
}

impl<S: OrderSource> BoardService<S> {
    pub fn new(source: S, page_limit: usize) -> Self {
        Self {
            source,
            page_limit,
            state: RwLock::new(BoardState::default()),
            alerts: Mutex::new(AlertTracker::new()),
        }
    }

    pub async fn state(&self) -> BoardState {
        self.state.read().await.clone()
    }

    /// Fetch the full order list and replace the board with it. On failure
    /// the previous snapshot stays up and the error lands in the footer.
    pub async fn resync(&self, trigger: SyncTrigger) -> Result<SyncReport, SourceError> {
        match self.source.fetch_orders(self.page_limit).await {
            Ok(orders) => {
                let lanes = LaneBoard::classify(orders);
                let pending: Vec<Uuid> = lanes.pending_ids().collect();
                let new_pending = self.alerts.lock().await.observe(pending);

                let mut state = self.state.write().await;
                state.lanes = lanes;
                state.synced_at = Some(Utc::now());
                state.pending_cues += new_pending.len();
                let report = SyncReport {
                    total: state.lanes.total(),
                    new_pending,
                };
                tracing::debug!(?trigger, total = report.total, "board resynced");
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(?trigger, error = %err, "resync failed, keeping last snapshot");
                let mut state = self.state.write().await;
                state.notice = Some(Notice::from(&err));
                Err(err)
            }
        }
    }

    /// Try the focused lane's action on a card. The transition table is
    /// consulted against the current snapshot before anything leaves the
    /// client, so blocked cards never produce a request.
    pub async fn advance(
        &self,
        lane: Lane,
        order_id: Uuid,
    ) -> Result<Option<LaneAction>, SourceError> {
        let status = {
            let state = self.state.read().await;
            state
                .lanes
                .lane(lane)
                .iter()
                .find(|o| o.id == order_id)
                .map(|o| o.status)
        };
        let Some(status) = status else {
            // The card vanished under the cursor; a resync got there first.
            self.push_notice(Notice::info("order is no longer on the board"))
                .await;
            return Ok(None);
        };
        let Some(action) = next_action(lane, status) else {
            self.push_notice(Notice::info(blocked_reason(lane, status)))
                .await;
            return Ok(None);
        };

        match self.source.update_status(order_id, action.target()).await {
            Ok(order) => {
                tracing::info!(order = %order.id, status = ?order.status, "status advanced");
                Ok(Some(action))
            }
            Err(err) => {
                tracing::warn!(order = %order_id, error = %err, "status change refused");
                self.push_notice(Notice::from(&err)).await;
                Err(err)
            }
        }
    }

    pub async fn push_notice(&self, notice: Notice) {
        self.state.write().await.notice = Some(notice);
    }

    /// Drop the footer notice once it has outlived its TTL.
    pub async fn expire_notice(&self) {
        let mut state = self.state.write().await;
        if state.notice.as_ref().is_some_and(|n| n.expired()) {
            state.notice = None;
        }
    }

    pub async fn set_online(&self, online: bool) {
        self.state.write().await.online = online;
    }

    /// Cues accumulated since the last drain. The caller gates them with the
    /// sound toggle; draining regardless keeps stale cues from piling up
    /// while sound is off.
    pub async fn take_cues(&self) -> usize {
        let mut state = self.state.write().await;
        std::mem::take(&mut state.pending_cues)
    }
}

/// Coalesce trigger bursts into single fetches: take the first trigger,
/// sleep out the debounce window, drain whatever piled up behind it, then
/// resync once. A burst of push events becomes exactly one request.
pub async fn run_sync_loop<S: OrderSource>(
    service: Arc<BoardService<S>>,
    mut triggers: mpsc::Receiver<SyncTrigger>,
    debounce: Duration,
) {
    while let Some(first) = triggers.recv().await {
        tokio::time::sleep(debounce).await;
        let mut coalesced = 0usize;
        while triggers.try_recv().is_ok() {
            coalesced += 1;
        }
        if coalesced > 0 {
            tracing::debug!(?first, coalesced, "coalesced trigger burst");
        }
        let _ = service.resync(first).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kds_sim::SimKitchen;
    use kds_types::domain::order::{Order, OrderStatus, TableRef};

    fn seeded(status: OrderStatus, number: u32) -> Order {
        let mut order = Order::new(
            number,
            TableRef {
                id: Uuid::new_v4(),
                label: format!("T{number}"),
            },
            vec![],
            500,
        );
        order.status = status;
        order
    }

    #[tokio::test]
    async fn resync_replaces_the_snapshot_and_reports_new_pending() {
        let kitchen = SimKitchen::new();
        let pending = seeded(OrderStatus::Pending, 1);
        kitchen.seed(pending.clone());
        kitchen.seed(seeded(OrderStatus::Served, 2));

        let svc = BoardService::new(kitchen, 100);
        let report = svc.resync(SyncTrigger::Startup).await.unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.new_pending, vec![pending.id]);

        // Same snapshot again: nothing newly pending.
        let again = svc.resync(SyncTrigger::Push).await.unwrap();
        assert!(again.new_pending.is_empty());

        let state = svc.state().await;
        assert_eq!(state.lanes.received.len(), 1);
        assert!(state.synced_at.is_some());
        assert_eq!(state.pending_cues, 1);
    }

    #[tokio::test]
    async fn advance_refuses_blocked_cards_locally() {
        let kitchen = SimKitchen::new();
        let pending = seeded(OrderStatus::Pending, 3);
        kitchen.seed(pending.clone());

        let svc = BoardService::new(kitchen, 100);
        svc.resync(SyncTrigger::Startup).await.unwrap();

        let moved = svc.advance(Lane::Received, pending.id).await.unwrap();
        assert_eq!(moved, None);
        let state = svc.state().await;
        assert!(state.notice.is_some());
        // Still pending: nothing was sent to the kitchen.
        assert_eq!(state.lanes.received[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn take_cues_drains_once() {
        let kitchen = SimKitchen::new();
        kitchen.seed(seeded(OrderStatus::Pending, 4));
        let svc = BoardService::new(kitchen, 100);
        svc.resync(SyncTrigger::Startup).await.unwrap();

        assert_eq!(svc.take_cues().await, 1);
        assert_eq!(svc.take_cues().await, 0);
    }
}
