//! Hedging quote fills on the reference instrument.
//!
//! Every quote fill is offset immediately with an opposite order of the same
//! volume on the reference instrument, priced at the venue's outer bound so
//! it crosses whatever is on the book. Hedges are fire-and-forget: their
//! fills only move the hedge position reported to telemetry.

use std::collections::BTreeMap;

use rtg_core::{OrderId, OrderIdGenerator, OrderSide, Price, Volume};
use tracing::{debug, warn};

use crate::error::{MmError, MmResult};

/// Outstanding hedges kept for fill attribution.
const MAX_TRACKED_HEDGES: usize = 1024;

/// Hedge order to send on the reference instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HedgeOrder {
    pub id: OrderId,
    pub side: OrderSide,
    pub price: Price,
    pub volume: Volume,
}

#[derive(Debug, Clone, Copy)]
struct HedgeRecord {
    side: OrderSide,
    remaining: Volume,
}

/// Issues hedge orders and tracks the filled hedge position.
#[derive(Debug)]
pub struct HedgeIssuer {
    /// Lowest tick-aligned price a sell hedge can use.
    min_bid_nearest_tick: Price,
    /// Highest tick-aligned price a buy hedge can use.
    max_ask_nearest_tick: Price,
    outstanding: BTreeMap<OrderId, HedgeRecord>,
    position: i64,
    filled_volume: u64,
    /// Σ price × volume over hedge fills, in price units.
    filled_notional: i64,
}

impl HedgeIssuer {
    pub fn new(tick_size: i64, min_bid_price: i64, max_ask_price: i64) -> Self {
        let tick = tick_size.max(1);
        Self {
            min_bid_nearest_tick: Price((min_bid_price + tick) / tick * tick),
            max_ask_nearest_tick: Price(max_ask_price / tick * tick),
            outstanding: BTreeMap::new(),
            position: 0,
            filled_volume: 0,
            filled_notional: 0,
        }
    }

    /// Build the hedge for a quote fill of `volume` on `filled_side`.
    pub fn on_quote_fill(
        &mut self,
        filled_side: OrderSide,
        volume: Volume,
        ids: &mut OrderIdGenerator,
    ) -> Option<HedgeOrder> {
        if volume.is_zero() {
            return None;
        }
        let side = filled_side.opposite();
        let price = match side {
            OrderSide::Sell => self.min_bid_nearest_tick,
            OrderSide::Buy => self.max_ask_nearest_tick,
        };
        let id = ids.next_id();

        if self.outstanding.len() >= MAX_TRACKED_HEDGES {
            if let Some((oldest, _)) = self.outstanding.pop_first() {
                debug!(order_id = %oldest, "Dropping oldest unfilled hedge record");
            }
        }
        self.outstanding.insert(
            id,
            HedgeRecord {
                side,
                remaining: volume,
            },
        );

        Some(HedgeOrder {
            id,
            side,
            price,
            volume,
        })
    }

    /// Apply a hedge fill; returns the new hedge position.
    pub fn on_hedge_fill(&mut self, id: OrderId, price: Price, volume: Volume) -> MmResult<i64> {
        let record = self
            .outstanding
            .get_mut(&id)
            .ok_or(MmError::UnknownHedge(id))?;

        let applied = volume.min(record.remaining);
        if applied < volume {
            warn!(order_id = %id, fill = %volume, remaining = %record.remaining, "Hedge overfill");
        }
        record.remaining = record.remaining.saturating_sub(applied);
        let side = record.side;
        if record.remaining.is_zero() {
            self.outstanding.remove(&id);
        }

        self.position += side.signed(applied.lots());
        self.filled_volume += u64::from(applied.lots());
        self.filled_notional += price.units() * applied.as_i64();
        debug!(
            order_id = %id,
            side = %side,
            price = %price,
            volume = %applied,
            hedge_position = self.position,
            "Hedge filled"
        );
        Ok(self.position)
    }

    /// Stop tracking a hedge the venue will not fill.
    pub fn forget(&mut self, id: OrderId) -> bool {
        self.outstanding.remove(&id).is_some()
    }

    pub fn is_hedge(&self, id: OrderId) -> bool {
        self.outstanding.contains_key(&id)
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn filled_volume(&self) -> u64 {
        self.filled_volume
    }

    /// Volume-weighted hedge fill price.
    pub fn average_price(&self) -> Option<f64> {
        if self.filled_volume == 0 {
            return None;
        }
        Some(self.filled_notional as f64 / self.filled_volume as f64)
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }

    pub fn min_bid_nearest_tick(&self) -> Price {
        self.min_bid_nearest_tick
    }

    pub fn max_ask_nearest_tick(&self) -> Price {
        self.max_ask_nearest_tick
    }
}
