//! Order-book snapshots and trade prints.
//!
//! Both carry up to five levels per side, best first. The venue zero-fills
//! missing levels, so a zero price marks the end of a side.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::market::Instrument;
use crate::price::{Price, Volume};

/// Maximum depth published per side.
pub const BOOK_DEPTH: usize = 5;

/// Book validity state.
///
/// Only `Valid` books feed the quoting cycle; every other state skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookState {
    /// Both sides present and consistently ordered.
    Valid,
    /// No bid side (best bid is zero).
    NoBid,
    /// No ask side (best ask is zero).
    NoAsk,
    /// Both sides missing.
    Empty,
    /// Best ask at or below best bid.
    Crossed,
    /// Levels out of order, negative, or non-zero after a gap.
    Unordered,
    /// More than `BOOK_DEPTH` levels on a side.
    TooDeep,
}

impl BookState {
    /// Check if this state allows a quoting decision.
    pub fn is_quotable(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl std::fmt::Display for BookState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "VALID"),
            Self::NoBid => write!(f, "NO_BID"),
            Self::NoAsk => write!(f, "NO_ASK"),
            Self::Empty => write!(f, "EMPTY"),
            Self::Crossed => write!(f, "CROSSED"),
            Self::Unordered => write!(f, "UNORDERED"),
            Self::TooDeep => write!(f, "TOO_DEEP"),
        }
    }
}

/// One price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub volume: Volume,
}

impl BookLevel {
    pub fn new(price: i64, volume: u32) -> Self {
        Self {
            price: Price(price),
            volume: Volume(volume),
        }
    }
}

/// Order-book snapshot for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub instrument: Instrument,
    /// Venue sequence number, increasing per instrument.
    pub sequence: u64,
    /// Ask levels, best (lowest) first.
    #[serde(default)]
    pub asks: Vec<BookLevel>,
    /// Bid levels, best (highest) first.
    #[serde(default)]
    pub bids: Vec<BookLevel>,
}

impl MarketSnapshot {
    pub fn new(
        instrument: Instrument,
        sequence: u64,
        asks: Vec<BookLevel>,
        bids: Vec<BookLevel>,
    ) -> Self {
        Self {
            instrument,
            sequence,
            asks,
            bids,
        }
    }

    /// Best ask, if the side is present.
    pub fn best_ask(&self) -> Option<Price> {
        first_price(&self.asks)
    }

    /// Best bid, if the side is present.
    pub fn best_bid(&self) -> Option<Price> {
        first_price(&self.bids)
    }

    /// Classify the snapshot.
    pub fn state(&self) -> BookState {
        if self.asks.len() > BOOK_DEPTH || self.bids.len() > BOOK_DEPTH {
            return BookState::TooDeep;
        }
        if !side_is_ordered(&self.asks, |prev, next| next > prev)
            || !side_is_ordered(&self.bids, |prev, next| next < prev)
        {
            return BookState::Unordered;
        }
        match (self.best_bid(), self.best_ask()) {
            (None, None) => BookState::Empty,
            (None, Some(_)) => BookState::NoBid,
            (Some(_), None) => BookState::NoAsk,
            (Some(bid), Some(ask)) if ask <= bid => BookState::Crossed,
            _ => BookState::Valid,
        }
    }

    /// Reject anything that cannot drive a quoting cycle.
    pub fn validate(&self) -> Result<(), CoreError> {
        let state = self.state();
        if state.is_quotable() {
            Ok(())
        } else {
            Err(CoreError::MalformedSnapshot {
                sequence: self.sequence,
                state,
            })
        }
    }

    /// Midpoint of the best bid and ask (valid books only).
    pub fn mid_price(&self) -> Option<f64> {
        if !self.state().is_quotable() {
            return None;
        }
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.as_f64() + ask.as_f64()) / 2.0),
            _ => None,
        }
    }
}

/// Aggregated trades since the previous print for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradePrint {
    pub instrument: Instrument,
    pub sequence: u64,
    /// Prices traded against resting asks, best first.
    #[serde(default)]
    pub asks: Vec<BookLevel>,
    /// Prices traded against resting bids, best first.
    #[serde(default)]
    pub bids: Vec<BookLevel>,
}

impl TradePrint {
    /// Whether every populated level has a positive price and the depth fits.
    pub fn is_well_formed(&self) -> bool {
        self.asks.len() <= BOOK_DEPTH
            && self.bids.len() <= BOOK_DEPTH
            && self
                .asks
                .iter()
                .chain(self.bids.iter())
                .all(|l| l.price.units() >= 0)
    }

    /// Midpoint of the best traded ask and bid, when both traded.
    pub fn mid_price(&self) -> Option<f64> {
        if !self.is_well_formed() {
            return None;
        }
        match (first_price(&self.bids), first_price(&self.asks)) {
            (Some(bid), Some(ask)) => Some((bid.as_f64() + ask.as_f64()) / 2.0),
            _ => None,
        }
    }
}

fn first_price(levels: &[BookLevel]) -> Option<Price> {
    levels
        .first()
        .map(|l| l.price)
        .filter(|p| p.is_positive())
}

/// Non-zero prices must be positive, strictly ordered, and contiguous
/// (a zero level may only be followed by zero levels).
fn side_is_ordered(levels: &[BookLevel], in_order: impl Fn(Price, Price) -> bool) -> bool {
    let mut prev: Option<Price> = None;
    let mut ended = false;
    for level in levels {
        let price = level.price;
        if price.units() < 0 {
            return false;
        }
        if price.is_zero() {
            ended = true;
            continue;
        }
        if ended {
            return false;
        }
        if let Some(p) = prev {
            if !in_order(p, price) {
                return false;
            }
        }
        prev = Some(price);
    }
    true
}
