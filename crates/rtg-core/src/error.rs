//! Error types for rtg-core.

use thiserror::Error;

use crate::book::BookState;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Malformed snapshot seq={sequence}: {state}")]
    MalformedSnapshot { sequence: u64, state: BookState },

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    #[error("Unknown instrument id: {0}")]
    UnknownInstrument(u8),

    #[error("Event decode error: {0}")]
    EventDecode(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
