//! Order and inventory state for the market maker.
//!
//! # Key Components
//!
//! - [`OrderStateTracker`]: authoritative table of live quote orders,
//!   theoretical vs confirmed inventory, exposure and order-count guards,
//!   staleness detection
//! - [`OrderRecord`]: one live order
//! - [`InventoryState`]: theoretical and confirmed position

pub mod error;
pub mod tracker;

pub use error::{PositionError, PositionResult};
pub use tracker::{
    FillOutcome, InventoryState, OrderRecord, OrderStateTracker, TerminalOutcome, TrackerLimits,
};
