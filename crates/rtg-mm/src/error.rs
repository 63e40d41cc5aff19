//! Market maker error types.
//!
//! None of these stop the engine. A handler that returns an error has left
//! every piece of state consistent; the caller only logs it.

use rtg_core::{CoreError, Instrument, OrderId};
use rtg_position::PositionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MmError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error("Out-of-order {instrument} sequence {sequence} (last {last})")]
    StaleSequence {
        instrument: Instrument,
        sequence: u64,
        last: u64,
    },

    #[error("Malformed trade print for {instrument} seq={sequence}")]
    MalformedTradePrint { instrument: Instrument, sequence: u64 },

    #[error("Fill for unknown order {0}")]
    UnknownOrder(OrderId),

    #[error("Fill for unknown hedge order {0}")]
    UnknownHedge(OrderId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type MmResult<T> = Result<T, MmError>;
