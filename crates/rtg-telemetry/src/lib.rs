//! Prometheus metrics and structured logging for the market maker.
//!
//! - Prometheus metrics for quoting, fills, hedges and skipped input
//! - Structured JSON logging with tracing
//! - Per-session statistics summarized at shutdown

pub mod error;
pub mod logging;
pub mod metrics;
pub mod session_stats;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
pub use session_stats::{SessionStats, SessionSummary};
