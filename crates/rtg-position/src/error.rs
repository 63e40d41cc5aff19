//! Position error types.

use rtg_core::{OrderId, Volume};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),

    #[error("Order id already tracked: {0}")]
    DuplicateOrder(OrderId),

    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    #[error("Order already reported terminal: {0}")]
    AlreadyTerminal(OrderId),

    #[error("Order {id} is not terminal ({remaining} remaining)")]
    NotTerminal { id: OrderId, remaining: Volume },
}

pub type PositionResult<T> = Result<T, PositionError>;
