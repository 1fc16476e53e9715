//! Walks a ticket across the board against the simulated kitchen, no
//! terminal needed.
//!
//! To run: cargo r --example feed_probe

use std::sync::Arc;

use kds_board::application::board::{BoardService, SyncTrigger};
use kds_sim::SimKitchen;
use kds_types::domain::action::LaneAction;
use kds_types::domain::lane::Lane;
use kds_types::domain::order::OrderStatus;
use kds_types::ports::order_source::OrderSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let kitchen = SimKitchen::new();
    for _ in 0..4 {
        kitchen.file_order();
    }

    let service = Arc::new(BoardService::new(kitchen.clone(), 100));
    let report = service.resync(SyncTrigger::Startup).await?;
    println!(
        "fetched {} orders, {} newly pending",
        report.total,
        report.new_pending.len()
    );

    // Accept the oldest ticket kitchen-side, then walk it across the board.
    let ticket = service.state().await.lanes.received[0].clone();
    kitchen
        .update_status(ticket.id, OrderStatus::Accepted)
        .await?;
    service.resync(SyncTrigger::Push).await?;

    let moved = service.advance(Lane::Received, ticket.id).await?;
    assert_eq!(moved, Some(LaneAction::StartCooking));
    service.resync(SyncTrigger::PostAction).await?;

    let state = service.state().await;
    println!(
        "lanes: received {} / preparing {} / ready {}",
        state.lanes.received.len(),
        state.lanes.preparing.len(),
        state.lanes.ready.len()
    );

    let moved = service.advance(Lane::Preparing, ticket.id).await?;
    assert_eq!(moved, Some(LaneAction::MarkReady));
    service.resync(SyncTrigger::PostAction).await?;
    println!("ticket #{:03} is ready for pickup", ticket.number);
    Ok(())
}
