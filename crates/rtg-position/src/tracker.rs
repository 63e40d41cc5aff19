//! Order state tracker.
//!
//! Single owner of every live quote order and of the two inventory views:
//!
//! - **confirmed**: position built from venue fills only
//! - **theoretical**: confirmed plus the signed remaining volume of every
//!   live order, i.e. the position if everything in flight filled
//!
//! `theoretical == confirmed + Σ side.sign() * remaining` holds after every
//! operation, so theoretical converges to confirmed once all orders are
//! terminal.
//!
//! The tracker never talks to the venue. Staleness is reported as a list of
//! candidates; the caller decides to cancel.

use std::collections::BTreeMap;

use rtg_core::{Lifespan, OrderId, OrderSide, Price, Volume};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PositionError, PositionResult};

/// Exposure limits enforced by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerLimits {
    /// Absolute position limit in lots.
    pub position_limit: i64,
    /// Maximum live quote orders.
    pub max_active_orders: usize,
}

/// One live quote order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub side: OrderSide,
    pub price: Price,
    /// Volume at submission.
    pub volume: Volume,
    pub remaining: Volume,
    pub filled: Volume,
    pub lifespan: Lifespan,
    pub submitted_at_ms: u64,
    /// Venue has confirmed the order (it rests on the book).
    pub acknowledged: bool,
    /// A cancel was sent and not yet confirmed.
    pub cancel_requested: bool,
    /// The venue already reported the order terminal; `remaining` is
    /// filled volume whose fill messages have not arrived yet.
    #[serde(default)]
    pub awaiting_fills: bool,
}

impl OrderRecord {
    pub fn new(
        id: OrderId,
        side: OrderSide,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
        submitted_at_ms: u64,
    ) -> Self {
        Self {
            id,
            side,
            price,
            volume,
            remaining: volume,
            filled: Volume::ZERO,
            lifespan,
            submitted_at_ms,
            acknowledged: false,
            cancel_requested: false,
            awaiting_fills: false,
        }
    }

    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.submitted_at_ms)
    }
}

/// Theoretical and confirmed position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryState {
    pub theoretical: i64,
    pub confirmed: i64,
}

/// Result of applying a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOutcome {
    pub side: OrderSide,
    /// Volume actually applied (clamped to the remaining volume).
    pub applied: Volume,
    pub remaining: Volume,
    /// The order is fully filled and no longer tracked.
    pub completed: bool,
}

/// How an order left the book without filling completely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalOutcome {
    /// Never accepted onto the book.
    Rejected { side: OrderSide, volume: Volume },
    /// Cancelled with nothing filled.
    Cancelled { side: OrderSide, volume: Volume },
    /// Cancelled after part of it traded.
    PartialFillThenCancel {
        side: OrderSide,
        filled: Volume,
        cancelled: Volume,
    },
}

impl TerminalOutcome {
    pub fn side(&self) -> OrderSide {
        match self {
            Self::Rejected { side, .. }
            | Self::Cancelled { side, .. }
            | Self::PartialFillThenCancel { side, .. } => *side,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Cancelled { .. } => "cancelled",
            Self::PartialFillThenCancel { .. } => "partial_then_cancelled",
        }
    }
}

/// Authoritative record of live quote orders and inventory.
#[derive(Debug)]
pub struct OrderStateTracker {
    orders: BTreeMap<OrderId, OrderRecord>,
    inventory: InventoryState,
    limits: TrackerLimits,
}

impl OrderStateTracker {
    pub fn new(limits: TrackerLimits) -> Self {
        Self {
            orders: BTreeMap::new(),
            inventory: InventoryState::default(),
            limits,
        }
    }

    /// Track a newly submitted order.
    pub fn submit(&mut self, record: OrderRecord) -> PositionResult<()> {
        if record.volume.is_zero() {
            return Err(PositionError::InvalidVolume(format!(
                "order {} has zero volume",
                record.id
            )));
        }
        if self.orders.contains_key(&record.id) {
            return Err(PositionError::DuplicateOrder(record.id));
        }
        self.inventory.theoretical += record.side.signed(record.remaining.lots());
        debug!(
            order_id = %record.id,
            side = %record.side,
            price = %record.price,
            volume = %record.volume,
            theoretical = self.inventory.theoretical,
            "Order tracked"
        );
        self.orders.insert(record.id, record);
        Ok(())
    }

    /// Mark an order as resting on the book.
    pub fn acknowledge(&mut self, id: OrderId) -> PositionResult<()> {
        let record = self
            .orders
            .get_mut(&id)
            .ok_or(PositionError::UnknownOrder(id))?;
        record.acknowledged = true;
        Ok(())
    }

    /// Apply a fill: confirmed moves, theoretical does not.
    pub fn acknowledge_fill(&mut self, id: OrderId, volume: Volume) -> PositionResult<FillOutcome> {
        let record = self
            .orders
            .get_mut(&id)
            .ok_or(PositionError::UnknownOrder(id))?;

        let applied = if volume > record.remaining {
            warn!(
                order_id = %id,
                fill = %volume,
                remaining = %record.remaining,
                "Fill exceeds remaining volume, clamping"
            );
            record.remaining
        } else {
            volume
        };

        record.remaining = record.remaining.saturating_sub(applied);
        record.filled = Volume(record.filled.lots() + applied.lots());
        record.acknowledged = true;
        let side = record.side;
        let remaining = record.remaining;
        self.inventory.confirmed += side.signed(applied.lots());

        let completed = remaining.is_zero();
        if completed {
            self.orders.remove(&id);
        }

        debug!(
            order_id = %id,
            side = %side,
            applied = %applied,
            remaining = %remaining,
            confirmed = self.inventory.confirmed,
            "Fill applied"
        );

        Ok(FillOutcome {
            side,
            applied,
            remaining,
            completed,
        })
    }

    /// Retire an order the venue reports as gone (`remaining_volume == 0`).
    ///
    /// `filled_volume` is the venue's cumulative fill count for the order.
    /// Only the volume that never traded is rolled back out of theoretical
    /// inventory. Lots the venue reports filled but whose fill messages have
    /// not arrived stay on the record (flagged `awaiting_fills`) until
    /// `acknowledge_fill` moves them into confirmed inventory.
    pub fn acknowledge_terminal(
        &mut self,
        id: OrderId,
        filled_volume: Volume,
        remaining_volume: Volume,
    ) -> PositionResult<TerminalOutcome> {
        if !remaining_volume.is_zero() {
            return Err(PositionError::NotTerminal {
                id,
                remaining: remaining_volume,
            });
        }
        let mut record = self
            .orders
            .remove(&id)
            .ok_or(PositionError::UnknownOrder(id))?;
        if record.awaiting_fills {
            self.orders.insert(id, record);
            return Err(PositionError::AlreadyTerminal(id));
        }

        let filled = filled_volume.max(record.filled);
        let unreported = filled.saturating_sub(record.filled).min(record.remaining);
        let cancelled = record.remaining.saturating_sub(unreported);
        self.inventory.theoretical -= record.side.signed(cancelled.lots());

        let outcome = if !filled.is_zero() {
            TerminalOutcome::PartialFillThenCancel {
                side: record.side,
                filled,
                cancelled,
            }
        } else if record.acknowledged || record.cancel_requested {
            TerminalOutcome::Cancelled {
                side: record.side,
                volume: cancelled,
            }
        } else {
            TerminalOutcome::Rejected {
                side: record.side,
                volume: cancelled,
            }
        };

        if !unreported.is_zero() {
            warn!(
                order_id = %id,
                venue_filled = %filled_volume,
                local_filled = %record.filled,
                "Terminal ack reports fills not yet applied"
            );
            record.remaining = unreported;
            record.acknowledged = true;
            record.awaiting_fills = true;
            self.orders.insert(id, record);
        }

        debug!(
            order_id = %id,
            outcome = outcome.as_str(),
            theoretical = self.inventory.theoretical,
            "Order retired"
        );
        Ok(outcome)
    }

    /// The venue has closed the order and only its fills are outstanding.
    pub fn is_awaiting_fills(&self, id: OrderId) -> bool {
        self.orders.get(&id).is_some_and(|r| r.awaiting_fills)
    }

    /// Flag an order as having a cancel in flight.
    ///
    /// Returns false if the order is unknown or was already flagged.
    pub fn mark_cancel_requested(&mut self, id: OrderId) -> bool {
        match self.orders.get_mut(&id) {
            Some(record) if !record.cancel_requested => {
                record.cancel_requested = true;
                true
            }
            _ => false,
        }
    }

    /// Orders older than `max_age_ms` with no cancel in flight, oldest id first.
    pub fn expire_stale(&self, now_ms: u64, max_age_ms: u64) -> Vec<OrderId> {
        self.orders
            .values()
            .filter(|r| !r.cancel_requested && !r.awaiting_fills && r.age_ms(now_ms) > max_age_ms)
            .map(|r| r.id)
            .collect()
    }

    /// Live volume on one side.
    pub fn pending_volume(&self, side: OrderSide) -> i64 {
        self.orders
            .values()
            .filter(|r| r.side == side)
            .map(|r| r.remaining.as_i64())
            .sum()
    }

    /// Lots that can still be added on `side` without the worst case
    /// (confirmed plus every same-side order filling) crossing the limit.
    pub fn capacity(&self, side: OrderSide) -> i64 {
        let limit = self.limits.position_limit;
        let confirmed = self.inventory.confirmed;
        let in_flight = self.pending_volume(side);
        match side {
            OrderSide::Buy => limit - (confirmed + in_flight),
            OrderSide::Sell => limit + (confirmed - in_flight),
        }
        .max(0)
    }

    /// Confirmed position sits at the limit opposite to `side`, so an
    /// order on `side` only reduces exposure.
    pub fn is_unwinding(&self, side: OrderSide) -> bool {
        let limit = self.limits.position_limit;
        match side {
            OrderSide::Buy => self.inventory.confirmed <= -limit,
            OrderSide::Sell => self.inventory.confirmed >= limit,
        }
    }

    fn has_order_slot(&self) -> bool {
        self.orders.len() < self.limits.max_active_orders
    }

    pub fn can_quote_bid(&self) -> bool {
        self.has_order_slot() && self.capacity(OrderSide::Buy) > 0
    }

    pub fn can_quote_ask(&self) -> bool {
        self.has_order_slot() && self.capacity(OrderSide::Sell) > 0
    }

    pub fn can_quote(&self, side: OrderSide) -> bool {
        match side {
            OrderSide::Buy => self.can_quote_bid(),
            OrderSide::Sell => self.can_quote_ask(),
        }
    }

    pub fn inventory(&self) -> InventoryState {
        self.inventory
    }

    pub fn limits(&self) -> TrackerLimits {
        self.limits
    }

    pub fn active_count(&self) -> usize {
        self.orders.len()
    }

    pub fn get(&self, id: OrderId) -> Option<&OrderRecord> {
        self.orders.get(&id)
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &OrderRecord> {
        self.orders.values()
    }
}
