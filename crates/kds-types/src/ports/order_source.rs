use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{Order, OrderStatus};

/// How a fetch or status change can fail, in the terms the board shows the
/// operator.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// Bearer token missing or expired; the operator has to sign in again.
    #[error("session expired, sign in again")]
    Unauthorized,
    /// The server understood the request and refused it, saying why.
    #[error("{0}")]
    Rejected(String),
    /// Could not reach the server or read its answer.
    #[error("network error: {0}")]
    Transport(String),
}

/// The orders API as the board consumes it. The production adapter speaks
/// HTTP; the simulated kitchen implements the same trait in process.
#[async_trait]
pub trait OrderSource: Send + Sync + 'static {
    /// Current order list, at most `limit` orders. The board classifies the
    /// result itself and drops anything that no longer belongs on a lane.
    async fn fetch_orders(&self, limit: usize) -> Result<Vec<Order>, SourceError>;

    /// Ask the server to move an order to `status`. Returns the order as the
    /// server now sees it.
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, SourceError>;
}
