//! ETF/futures market maker application.
//!
//! Wires the engine to its inputs and outputs:
//! - JSON-lines event reader feeding a tokio channel
//! - Event loop handling one event at a time
//! - Logging order gateway
//! - Session summary at shutdown

pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod replay;

pub use app::Application;
pub use config::{AppConfig, ReplayConfig};
pub use error::{AppError, AppResult};
pub use gateway::{GatewayCounts, LoggingGateway};
pub use replay::{read_events, spawn_reader, ReplayReport};
