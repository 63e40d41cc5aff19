//! Market making strategy for the ETF/futures pair.
//!
//! Quotes the ETF around the futures mid and hedges every fill on the
//! futures:
//! - Quote calculation with the Avellaneda–Stoikov model
//! - Volatility estimate from reference mids
//! - Quote lifecycle management (place/cancel/replace per side)
//! - Fill hedging at the venue's outer price bounds
//!
//! # Architecture
//!
//! ```text
//! Future snapshot → MarketMaker.on_market_snapshot()
//!                    ├─ VolatilityEstimator: σ from log returns
//!                    ├─ compute_quotes: reservation price, spread, bid/ask
//!                    └─ QuoteLifecycleManager: MakerAction place/cancel
//!                         ↓
//!                    OrderGateway.submit_order() / cancel_order()
//!
//! Quote fill → OrderStateTracker → HedgeIssuer → OrderGateway.submit_hedge()
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod hedge;
pub mod quote_engine;
pub mod quote_manager;
pub mod volatility;

pub use config::{MakerConfig, VolatilityConfig, VolatilitySource};
pub use engine::MarketMaker;
pub use error::{MmError, MmResult};
pub use gateway::{GatewayCall, OrderGateway, RecordingGateway};
pub use hedge::{HedgeIssuer, HedgeOrder};
pub use quote_engine::{compute_quotes, time_remaining, QuoteInputs, QuoteParams, QuoteTarget};
pub use quote_manager::{CancelReason, MakerAction, QuoteLifecycleManager, SideState};
pub use volatility::VolatilityEstimator;
