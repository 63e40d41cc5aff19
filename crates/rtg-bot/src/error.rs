//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(#[from] rtg_mm::MmError),

    #[error("Event error: {0}")]
    Event(#[from] rtg_core::CoreError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] rtg_telemetry::TelemetryError),

    #[error("Replay error: {0}")]
    Replay(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
