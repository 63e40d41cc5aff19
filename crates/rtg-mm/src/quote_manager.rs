//! Quote lifecycle management.
//!
//! One state machine per side of the quoted instrument:
//!
//! ```text
//! Idle ──submit──▶ Pending ──ack──▶ Resting ──reprice/stale──▶ Cancelling
//!   ▲                 │                │                           │
//!   └──── reject ─────┘◀── full fill ──┘◀──── terminal ack ────────┘
//! ```
//!
//! A side only submits from `Idle`, so a replacement never goes out before
//! the venue has confirmed the previous order is gone. The manager writes
//! every submission and cancel request into the `OrderStateTracker` in the
//! same step, keeping the exposure guards current within one cycle.

use rtg_core::{Lifespan, OrderId, OrderIdGenerator, OrderSide, Price, Volume};
use rtg_position::{FillOutcome, OrderRecord, OrderStateTracker};
use tracing::debug;

use crate::config::MakerConfig;
use crate::error::MmResult;
use crate::quote_engine::QuoteTarget;

/// Per-side quote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideState {
    Idle,
    /// Submitted, not yet confirmed by the venue.
    Pending {
        id: OrderId,
        price: Price,
        volume: Volume,
    },
    /// Confirmed on the book.
    Resting {
        id: OrderId,
        price: Price,
        volume: Volume,
    },
    /// Cancel sent, waiting for the terminal ack.
    Cancelling { id: OrderId, price: Price },
}

impl SideState {
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::Idle => None,
            Self::Pending { id, .. } | Self::Resting { id, .. } | Self::Cancelling { id, .. } => {
                Some(*id)
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    fn price(&self) -> Option<Price> {
        match self {
            Self::Idle => None,
            Self::Pending { price, .. }
            | Self::Resting { price, .. }
            | Self::Cancelling { price, .. } => Some(*price),
        }
    }
}

/// Why a quote is being cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Target price moved away from the resting price.
    Reprice,
    /// Order outlived the staleness limit.
    Stale,
    /// Remainder pulled after a partial fill.
    Fill,
}

impl CancelReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reprice => "reprice",
            Self::Stale => "stale",
            Self::Fill => "fill",
        }
    }
}

/// Actions the lifecycle manager wants sent to the venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MakerAction {
    Place {
        id: OrderId,
        side: OrderSide,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    },
    Cancel {
        id: OrderId,
        side: OrderSide,
        reason: CancelReason,
    },
}

/// Reconciles desired quotes against live orders.
#[derive(Debug)]
pub struct QuoteLifecycleManager {
    bid: SideState,
    ask: SideState,
    lot_size: u32,
    unwind_volume: u32,
    tick_size: i64,
    requote_threshold_ticks: i64,
    lifespan: Lifespan,
    cancel_on_fill: bool,
}

impl QuoteLifecycleManager {
    pub fn new(config: &MakerConfig) -> Self {
        Self {
            bid: SideState::Idle,
            ask: SideState::Idle,
            lot_size: config.lot_size,
            unwind_volume: config.unwind_volume,
            tick_size: config.tick_size,
            requote_threshold_ticks: config.requote_threshold_ticks.max(1),
            lifespan: config.quote_lifespan,
            cancel_on_fill: config.cancel_on_fill,
        }
    }

    pub fn state(&self, side: OrderSide) -> SideState {
        match side {
            OrderSide::Buy => self.bid,
            OrderSide::Sell => self.ask,
        }
    }

    fn slot_mut(&mut self, side: OrderSide) -> &mut SideState {
        match side {
            OrderSide::Buy => &mut self.bid,
            OrderSide::Sell => &mut self.ask,
        }
    }

    /// Side whose current order is `id`.
    pub fn side_of(&self, id: OrderId) -> Option<OrderSide> {
        [OrderSide::Buy, OrderSide::Sell]
            .into_iter()
            .find(|&side| self.state(side).order_id() == Some(id))
    }

    /// Diff the target against both sides.
    ///
    /// Resting orders priced away from the target are cancelled; idle sides
    /// with room under the guards get a new order. Submissions are recorded
    /// in `tracker` before returning.
    pub fn reconcile(
        &mut self,
        target: &QuoteTarget,
        tracker: &mut OrderStateTracker,
        ids: &mut OrderIdGenerator,
        now_ms: u64,
    ) -> MmResult<Vec<MakerAction>> {
        let mut actions = Vec::new();
        for side in [OrderSide::Buy, OrderSide::Sell] {
            let desired = match side {
                OrderSide::Buy => target.bid,
                OrderSide::Sell => target.ask,
            };
            if let Some(action) = self.reconcile_side(side, desired, tracker, ids, now_ms)? {
                actions.push(action);
            }
        }
        Ok(actions)
    }

    fn reconcile_side(
        &mut self,
        side: OrderSide,
        desired: Price,
        tracker: &mut OrderStateTracker,
        ids: &mut OrderIdGenerator,
        now_ms: u64,
    ) -> MmResult<Option<MakerAction>> {
        if !desired.is_positive() {
            return Ok(None);
        }

        match self.state(side) {
            SideState::Resting { id, price, .. } => {
                if price.ticks_from(desired, self.tick_size) < self.requote_threshold_ticks {
                    return Ok(None);
                }
                tracker.mark_cancel_requested(id);
                *self.slot_mut(side) = SideState::Cancelling { id, price };
                debug!(
                    order_id = %id,
                    side = %side,
                    resting = %price,
                    target = %desired,
                    "Requote: cancelling resting order"
                );
                Ok(Some(MakerAction::Cancel {
                    id,
                    side,
                    reason: CancelReason::Reprice,
                }))
            }
            SideState::Idle => {
                if !tracker.can_quote(side) {
                    debug!(side = %side, "Quote blocked by exposure guard");
                    return Ok(None);
                }
                let volume = self.order_volume(side, tracker);
                if volume.is_zero() {
                    return Ok(None);
                }
                let id = ids.next_id();
                tracker.submit(OrderRecord::new(
                    id,
                    side,
                    desired,
                    volume,
                    self.lifespan,
                    now_ms,
                ))?;
                *self.slot_mut(side) = SideState::Pending {
                    id,
                    price: desired,
                    volume,
                };
                Ok(Some(MakerAction::Place {
                    id,
                    side,
                    price: desired,
                    volume,
                    lifespan: self.lifespan,
                }))
            }
            SideState::Pending { .. } | SideState::Cancelling { .. } => Ok(None),
        }
    }

    /// Lot size, or the unwind size when the position is pinned at the
    /// opposite limit, capped by the remaining capacity.
    fn order_volume(&self, side: OrderSide, tracker: &OrderStateTracker) -> Volume {
        let base = if tracker.is_unwinding(side) {
            self.unwind_volume
        } else {
            self.lot_size
        };
        Volume::from_capacity(tracker.capacity(side).min(i64::from(base)))
    }

    /// Non-terminal ack: a pending order now rests on the book.
    pub fn on_order_ack(&mut self, id: OrderId) -> bool {
        let Some(side) = self.side_of(id) else {
            return false;
        };
        let slot = self.slot_mut(side);
        if let SideState::Pending { id, price, volume } = *slot {
            *slot = SideState::Resting { id, price, volume };
            return true;
        }
        false
    }

    /// The order left the book (cancel confirmed, reject, error).
    pub fn on_terminal(&mut self, id: OrderId) -> Option<OrderSide> {
        let side = self.side_of(id)?;
        *self.slot_mut(side) = SideState::Idle;
        debug!(order_id = %id, side = %side, "Quote side idle");
        Some(side)
    }

    /// Apply a fill to the side state.
    ///
    /// A completed order frees the side. With `cancel_on_fill`, a partial
    /// fill on a live order pulls the remainder.
    pub fn on_fill(
        &mut self,
        id: OrderId,
        outcome: &FillOutcome,
        tracker: &mut OrderStateTracker,
    ) -> Option<MakerAction> {
        let side = self.side_of(id)?;
        let slot = self.slot_mut(side);

        if outcome.completed {
            *slot = SideState::Idle;
            return None;
        }

        let (price, volume) = match *slot {
            SideState::Pending { price, volume, .. } | SideState::Resting { price, volume, .. } => {
                (price, volume)
            }
            _ => return None,
        };

        if self.cancel_on_fill {
            tracker.mark_cancel_requested(id);
            *self.slot_mut(side) = SideState::Cancelling { id, price };
            return Some(MakerAction::Cancel {
                id,
                side,
                reason: CancelReason::Fill,
            });
        }

        *self.slot_mut(side) = SideState::Resting { id, price, volume };
        None
    }

    /// Cancel a specific live order (staleness).
    ///
    /// Returns `None` if the order is unknown or already being cancelled.
    pub fn request_cancel(
        &mut self,
        id: OrderId,
        reason: CancelReason,
        tracker: &mut OrderStateTracker,
    ) -> Option<MakerAction> {
        let side = tracker.get(id)?.side;
        if !tracker.mark_cancel_requested(id) {
            return None;
        }
        let slot = self.slot_mut(side);
        if slot.order_id() == Some(id) {
            if let Some(price) = slot.price() {
                *slot = SideState::Cancelling { id, price };
            }
        }
        Some(MakerAction::Cancel { id, side, reason })
    }
}
