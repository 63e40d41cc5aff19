//! Core domain types for the ETF/futures market maker.
//!
//! This crate provides fundamental types used throughout the engine:
//! - `Price`, `Volume`: integer venue units
//! - `OrderSide`, `Lifespan`, `OrderId`: order vocabulary
//! - `Instrument`: the two instruments traded on the venue
//! - `MarketSnapshot`, `TradePrint`: market data with book validation
//! - `InboundEvent`: everything the venue connection delivers to the engine

pub mod book;
pub mod error;
pub mod event;
pub mod market;
pub mod order;
pub mod price;

pub use book::{BookLevel, BookState, MarketSnapshot, TradePrint, BOOK_DEPTH};
pub use error::{CoreError, Result};
pub use event::{EventEnvelope, InboundEvent};
pub use market::Instrument;
pub use order::{Lifespan, OrderId, OrderIdGenerator, OrderSide};
pub use price::{Price, Volume};
