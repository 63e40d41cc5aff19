//! Decision engine for one (quoted, reference) instrument pair.
//!
//! Handles one inbound event at a time:
//!
//! ```text
//! reference snapshot ─▶ VolatilityEstimator.observe
//!                     ─▶ stale-order sweep
//!                     ─▶ compute_quotes
//!                     ─▶ QuoteLifecycleManager.reconcile ─▶ gateway
//! order ack / fill   ─▶ OrderStateTracker ─▶ QuoteLifecycleManager
//!                                         └▶ HedgeIssuer ─▶ gateway
//! ```
//!
//! Every handler leaves the engine consistent. Errors are returned for
//! visibility (logging, tests) and never require the caller to recover.

use std::collections::HashMap;
use std::time::Instant;

use rtg_core::{
    EventEnvelope, InboundEvent, Instrument, MarketSnapshot, OrderId, OrderIdGenerator,
    OrderSide, Price, TradePrint, Volume,
};
use rtg_position::{OrderStateTracker, PositionError, TerminalOutcome};
use rtg_telemetry::{Metrics, SessionStats};
use tracing::{debug, info, warn};

use crate::config::{MakerConfig, VolatilitySource};
use crate::error::{MmError, MmResult};
use crate::gateway::OrderGateway;
use crate::hedge::HedgeIssuer;
use crate::quote_engine::{compute_quotes, time_remaining, QuoteInputs, QuoteParams, QuoteTarget};
use crate::quote_manager::{CancelReason, MakerAction, QuoteLifecycleManager, SideState};
use crate::volatility::VolatilityEstimator;

/// Market-data feeds with independent sequence numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Feed {
    Book,
    Trades,
}

/// Market maker for one instrument pair.
pub struct MarketMaker<G: OrderGateway> {
    config: MakerConfig,
    params: QuoteParams,
    volatility: VolatilityEstimator,
    tracker: OrderStateTracker,
    quotes: QuoteLifecycleManager,
    hedger: HedgeIssuer,
    ids: OrderIdGenerator,
    gateway: G,
    last_sequence: HashMap<(Feed, Instrument), u64>,
    session_start_ms: Option<u64>,
    last_target: Option<QuoteTarget>,
    last_reference_mid: Option<f64>,
    last_quoted_mid: Option<f64>,
    stats: SessionStats,
}

impl<G: OrderGateway> MarketMaker<G> {
    /// Build an engine; the configuration is validated first.
    pub fn new(config: MakerConfig, gateway: G) -> MmResult<Self> {
        config.validate()?;
        Ok(Self {
            params: QuoteParams::from_config(&config),
            volatility: VolatilityEstimator::from_config(&config.volatility),
            tracker: OrderStateTracker::new(config.tracker_limits()),
            quotes: QuoteLifecycleManager::new(&config),
            hedger: HedgeIssuer::new(
                config.tick_size,
                config.min_bid_price,
                config.max_ask_price,
            ),
            ids: OrderIdGenerator::new(),
            gateway,
            last_sequence: HashMap::new(),
            session_start_ms: None,
            last_target: None,
            last_reference_mid: None,
            last_quoted_mid: None,
            stats: SessionStats::new(),
            config,
        })
    }

    /// Route one timestamped event to its handler.
    pub fn handle(&mut self, envelope: &EventEnvelope) -> MmResult<()> {
        let started = Instant::now();
        let now_ms = envelope.ts_ms;
        let result = match &envelope.event {
            InboundEvent::Snapshot(snapshot) => self.on_market_snapshot(snapshot, now_ms),
            InboundEvent::TradePrint(print) => self.on_trade_print(print, now_ms),
            InboundEvent::OrderAck {
                order_id,
                filled_volume,
                remaining_volume,
                fees,
            } => self.on_order_ack(*order_id, *filled_volume, *remaining_volume, *fees, now_ms),
            InboundEvent::Fill {
                order_id,
                price,
                volume,
            } => self.on_fill(*order_id, *price, *volume, now_ms),
            InboundEvent::HedgeFill {
                order_id,
                price,
                volume,
            } => self.on_hedge_fill(*order_id, *price, *volume, now_ms),
            InboundEvent::Error { order_id, message } => self.on_error(*order_id, message, now_ms),
        };
        Metrics::event_handled(started.elapsed().as_secs_f64() * 1e6);
        result
    }

    /// Order-book snapshot for either instrument.
    ///
    /// Reference snapshots drive the quoting cycle; quoted-instrument
    /// snapshots only update the quoted mid.
    pub fn on_market_snapshot(&mut self, snapshot: &MarketSnapshot, now_ms: u64) -> MmResult<()> {
        self.start_clock(now_ms);
        let instrument = snapshot.instrument;
        self.check_sequence(Feed::Book, instrument, snapshot.sequence)?;

        if let Err(e) = snapshot.validate() {
            let state = snapshot.state();
            self.stats.skipped_events += 1;
            Metrics::market_event_skipped(instrument.as_str(), &state.to_string());
            debug!(
                instrument = %instrument,
                sequence = snapshot.sequence,
                state = %state,
                "Skipping snapshot"
            );
            return Err(e.into());
        }

        self.stats.snapshots += 1;
        Metrics::market_event(instrument.as_str(), "snapshot");
        let Some(mid) = snapshot.mid_price() else {
            return Ok(());
        };

        if instrument == self.config.quoted_instrument {
            self.last_quoted_mid = Some(mid);
            return Ok(());
        }
        if instrument != self.config.reference_instrument {
            return Ok(());
        }

        if self.config.volatility.source == VolatilitySource::Book {
            self.volatility.observe(mid);
        }
        self.run_quote_cycle(mid, now_ms)
    }

    /// Trade print; feeds the volatility estimate when configured to.
    pub fn on_trade_print(&mut self, print: &TradePrint, now_ms: u64) -> MmResult<()> {
        self.start_clock(now_ms);
        let instrument = print.instrument;
        self.check_sequence(Feed::Trades, instrument, print.sequence)?;

        if !print.is_well_formed() {
            self.stats.skipped_events += 1;
            Metrics::market_event_skipped(instrument.as_str(), "malformed_print");
            return Err(MmError::MalformedTradePrint {
                instrument,
                sequence: print.sequence,
            });
        }

        self.stats.trade_prints += 1;
        Metrics::market_event(instrument.as_str(), "trade_print");

        if instrument == self.config.reference_instrument
            && self.config.volatility.source == VolatilitySource::Trades
        {
            if let Some(mid) = print.mid_price() {
                self.volatility.observe(mid);
            }
        }
        Ok(())
    }

    /// Order status from the venue. `filled_volume` is cumulative; zero
    /// `remaining_volume` means the order is gone.
    pub fn on_order_ack(
        &mut self,
        id: OrderId,
        filled_volume: Volume,
        remaining_volume: Volume,
        fees: i64,
        now_ms: u64,
    ) -> MmResult<()> {
        self.start_clock(now_ms);
        if fees != 0 {
            self.stats.fees_units += fees;
            Metrics::fees(fees);
        }

        if !self.tracker.contains(id) {
            // Fully filled orders are retired on their last fill.
            debug!(order_id = %id, "Ack for untracked order");
            return Ok(());
        }

        if remaining_volume.is_zero() && self.tracker.is_awaiting_fills(id) {
            debug!(order_id = %id, "Repeated terminal ack");
            return Ok(());
        }

        if remaining_volume.is_zero() {
            let outcome = self
                .tracker
                .acknowledge_terminal(id, filled_volume, remaining_volume)?;
            self.record_terminal(id, &outcome);
            self.quotes.on_terminal(id);
            self.requote_after_idle(now_ms)?;
        } else {
            self.tracker.acknowledge(id)?;
            if self.quotes.on_order_ack(id) {
                debug!(order_id = %id, remaining = %remaining_volume, "Quote resting");
            }
        }
        self.publish_inventory();
        Ok(())
    }

    /// Quote fill: inventory, hedge, then side state.
    pub fn on_fill(&mut self, id: OrderId, price: Price, volume: Volume, now_ms: u64) -> MmResult<()> {
        self.start_clock(now_ms);
        let outcome = match self.tracker.acknowledge_fill(id, volume) {
            Ok(outcome) => outcome,
            Err(PositionError::UnknownOrder(_)) => {
                warn!(order_id = %id, price = %price, volume = %volume, "Fill for unknown order");
                return Err(MmError::UnknownOrder(id));
            }
            Err(e) => return Err(e.into()),
        };

        self.stats
            .record_fill(outcome.side, price, outcome.applied.lots());
        Metrics::quote_filled(&outcome.side.to_string(), outcome.applied.lots());
        info!(
            order_id = %id,
            side = %outcome.side,
            price = %price,
            volume = %outcome.applied,
            remaining = %outcome.remaining,
            confirmed = self.tracker.inventory().confirmed,
            "Quote filled"
        );

        if let Some(hedge) = self
            .hedger
            .on_quote_fill(outcome.side, outcome.applied, &mut self.ids)
        {
            self.gateway
                .submit_hedge(hedge.id, hedge.side, hedge.price, hedge.volume);
            self.stats.record_hedge(hedge.volume.lots());
            Metrics::hedge_submitted(&hedge.side.to_string(), hedge.volume.lots());
            info!(
                order_id = %hedge.id,
                side = %hedge.side,
                price = %hedge.price,
                volume = %hedge.volume,
                "Hedge submitted"
            );
        }

        if let Some(action) = self.quotes.on_fill(id, &outcome, &mut self.tracker) {
            self.dispatch(vec![action]);
        }
        if outcome.completed {
            self.requote_after_idle(now_ms)?;
        }
        self.publish_inventory();
        Ok(())
    }

    /// Fill on a hedge order.
    pub fn on_hedge_fill(
        &mut self,
        id: OrderId,
        price: Price,
        volume: Volume,
        now_ms: u64,
    ) -> MmResult<()> {
        self.start_clock(now_ms);
        match self.hedger.on_hedge_fill(id, price, volume) {
            Ok(position) => {
                Metrics::hedge_position(position);
                Ok(())
            }
            Err(e) => {
                warn!(order_id = %id, price = %price, volume = %volume, "Hedge fill for unknown order");
                Err(e)
            }
        }
    }

    /// Venue error. For a live quote this is equivalent to a reject.
    pub fn on_error(&mut self, id: OrderId, message: &str, now_ms: u64) -> MmResult<()> {
        self.start_clock(now_ms);
        self.stats.venue_errors += 1;
        Metrics::venue_error();
        warn!(order_id = %id, message = %message, "Venue error");

        if id.is_none() {
            return Ok(());
        }
        if self.tracker.contains(id) {
            return self.on_order_ack(id, Volume::ZERO, Volume::ZERO, 0, now_ms);
        }
        if self.hedger.forget(id) {
            debug!(order_id = %id, "Hedge dropped after venue error");
        }
        Ok(())
    }

    fn run_quote_cycle(&mut self, mid: f64, now_ms: u64) -> MmResult<()> {
        self.cancel_stale(now_ms);
        self.last_reference_mid = Some(mid);

        let Some(target) = self.target_for(mid, now_ms) else {
            return Ok(());
        };
        let actions = self
            .quotes
            .reconcile(&target, &mut self.tracker, &mut self.ids, now_ms)?;
        self.dispatch(actions);
        self.publish_inventory();
        Ok(())
    }

    /// Model quotes for `mid` at the current confirmed inventory.
    fn target_for(&mut self, mid: f64, now_ms: u64) -> Option<QuoteTarget> {
        let elapsed = now_ms.saturating_sub(self.session_start_ms.unwrap_or(now_ms));
        let inputs = QuoteInputs {
            mid,
            inventory: self.tracker.inventory().confirmed,
            volatility: self.volatility.estimate(),
            time_remaining: time_remaining(elapsed, self.config.horizon_ms()),
        };
        let Some(target) = compute_quotes(&inputs, &self.params) else {
            debug!(mid, "No quotes for mid");
            return None;
        };
        Metrics::quote_model(inputs.volatility, target.reservation_price, target.spread);
        debug!(
            mid,
            inventory = inputs.inventory,
            volatility = inputs.volatility,
            tau = inputs.time_remaining,
            reservation = target.reservation_price,
            spread = target.spread,
            bid = %target.bid,
            ask = %target.ask,
            "Quote target"
        );
        self.last_target = Some(target);
        Some(target)
    }

    /// Re-quote a side that just went idle, priced for the inventory the
    /// fill or cancel left behind.
    fn requote_after_idle(&mut self, now_ms: u64) -> MmResult<()> {
        if !self.config.requote_on_terminal {
            return Ok(());
        }
        let Some(mid) = self.last_reference_mid else {
            return Ok(());
        };
        let Some(target) = self.target_for(mid, now_ms) else {
            return Ok(());
        };
        let actions = self
            .quotes
            .reconcile(&target, &mut self.tracker, &mut self.ids, now_ms)?;
        self.dispatch(actions);
        Ok(())
    }

    fn cancel_stale(&mut self, now_ms: u64) {
        if self.config.stale_order_ms == 0 {
            return;
        }
        let stale = self.tracker.expire_stale(now_ms, self.config.stale_order_ms);
        let actions: Vec<MakerAction> = stale
            .into_iter()
            .filter_map(|id| {
                self.quotes
                    .request_cancel(id, CancelReason::Stale, &mut self.tracker)
            })
            .collect();
        self.dispatch(actions);
    }

    fn dispatch(&mut self, actions: Vec<MakerAction>) {
        for action in actions {
            match action {
                MakerAction::Place {
                    id,
                    side,
                    price,
                    volume,
                    lifespan,
                } => {
                    self.gateway.submit_order(id, side, price, volume, lifespan);
                    self.stats.quotes_submitted += 1;
                    Metrics::quote_submitted(&side.to_string());
                    info!(
                        order_id = %id,
                        side = %side,
                        price = %price,
                        volume = %volume,
                        lifespan = %lifespan,
                        "Quote submitted"
                    );
                }
                MakerAction::Cancel { id, side, reason } => {
                    self.gateway.cancel_order(id);
                    self.stats.cancels_requested += 1;
                    Metrics::quote_cancel_requested(&side.to_string(), reason.as_str());
                    info!(order_id = %id, side = %side, reason = reason.as_str(), "Quote cancel requested");
                }
            }
        }
    }

    fn record_terminal(&mut self, id: OrderId, outcome: &TerminalOutcome) {
        Metrics::order_terminal(outcome.as_str());
        match outcome {
            TerminalOutcome::Rejected { side, volume } => {
                self.stats.rejects += 1;
                warn!(order_id = %id, side = %side, volume = %volume, "Quote rejected");
            }
            TerminalOutcome::Cancelled { side, .. } => {
                info!(order_id = %id, side = %side, "Quote cancelled");
            }
            TerminalOutcome::PartialFillThenCancel {
                side,
                filled,
                cancelled,
            } => {
                info!(
                    order_id = %id,
                    side = %side,
                    filled = %filled,
                    cancelled = %cancelled,
                    "Quote cancelled after partial fill"
                );
            }
        }
    }

    fn check_sequence(&mut self, feed: Feed, instrument: Instrument, sequence: u64) -> MmResult<()> {
        if let Some(&last) = self.last_sequence.get(&(feed, instrument)) {
            if sequence <= last {
                self.stats.skipped_events += 1;
                Metrics::market_event_skipped(instrument.as_str(), "stale_sequence");
                return Err(MmError::StaleSequence {
                    instrument,
                    sequence,
                    last,
                });
            }
        }
        self.last_sequence.insert((feed, instrument), sequence);
        Ok(())
    }

    fn start_clock(&mut self, now_ms: u64) {
        if self.session_start_ms.is_none() {
            self.session_start_ms = Some(now_ms);
        }
    }

    fn publish_inventory(&self) {
        let inv = self.tracker.inventory();
        Metrics::inventory(inv.theoretical, inv.confirmed, self.tracker.active_count());
    }

    pub fn config(&self) -> &MakerConfig {
        &self.config
    }

    pub fn tracker(&self) -> &OrderStateTracker {
        &self.tracker
    }

    pub fn volatility(&self) -> &VolatilityEstimator {
        &self.volatility
    }

    pub fn hedger(&self) -> &HedgeIssuer {
        &self.hedger
    }

    pub fn quote_state(&self, side: OrderSide) -> SideState {
        self.quotes.state(side)
    }

    pub fn last_target(&self) -> Option<QuoteTarget> {
        self.last_target
    }

    pub fn last_quoted_mid(&self) -> Option<f64> {
        self.last_quoted_mid
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}
