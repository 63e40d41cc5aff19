//! Per-session trading statistics.
//!
//! Counts what the engine did over one session and renders a summary at
//! shutdown. Values are owned by the engine instance, not read back from
//! the global Prometheus registry, so two engines never mix counts.

use chrono::{DateTime, Utc};
use rtg_core::{OrderSide, Price};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::TelemetryResult;

/// Running session counters.
#[derive(Debug, Clone)]
pub struct SessionStats {
    start_time: DateTime<Utc>,
    pub snapshots: u64,
    pub trade_prints: u64,
    pub skipped_events: u64,
    pub quotes_submitted: u64,
    pub cancels_requested: u64,
    pub rejects: u64,
    pub fills: u64,
    pub bought_volume: u64,
    pub sold_volume: u64,
    /// Signed cash flow from quote fills in price units (sells positive).
    pub cash_flow_units: i64,
    pub hedges_submitted: u64,
    pub hedge_volume: u64,
    pub venue_errors: u64,
    pub fees_units: i64,
}

/// Summary rendered from `SessionStats`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub started_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub snapshots: u64,
    pub trade_prints: u64,
    pub skipped_events: u64,
    pub quotes_submitted: u64,
    pub cancels_requested: u64,
    pub rejects: u64,
    pub fills: u64,
    pub bought_volume: u64,
    pub sold_volume: u64,
    pub hedges_submitted: u64,
    pub hedge_volume: u64,
    pub venue_errors: u64,
    pub cash_flow: Decimal,
    pub fees: Decimal,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            snapshots: 0,
            trade_prints: 0,
            skipped_events: 0,
            quotes_submitted: 0,
            cancels_requested: 0,
            rejects: 0,
            fills: 0,
            bought_volume: 0,
            sold_volume: 0,
            cash_flow_units: 0,
            hedges_submitted: 0,
            hedge_volume: 0,
            venue_errors: 0,
            fees_units: 0,
        }
    }

    /// Record a quote fill.
    pub fn record_fill(&mut self, side: OrderSide, price: Price, volume: u32) {
        self.fills += 1;
        let notional = price.units() * i64::from(volume);
        match side {
            OrderSide::Buy => {
                self.bought_volume += u64::from(volume);
                self.cash_flow_units -= notional;
            }
            OrderSide::Sell => {
                self.sold_volume += u64::from(volume);
                self.cash_flow_units += notional;
            }
        }
    }

    pub fn record_hedge(&mut self, volume: u32) {
        self.hedges_submitted += 1;
        self.hedge_volume += u64::from(volume);
    }

    /// Build the summary, converting unit amounts with `unit_value`.
    pub fn summary(&self, unit_value: Decimal) -> SessionSummary {
        SessionSummary {
            started_at: self.start_time,
            duration_secs: (Utc::now() - self.start_time).num_seconds(),
            snapshots: self.snapshots,
            trade_prints: self.trade_prints,
            skipped_events: self.skipped_events,
            quotes_submitted: self.quotes_submitted,
            cancels_requested: self.cancels_requested,
            rejects: self.rejects,
            fills: self.fills,
            bought_volume: self.bought_volume,
            sold_volume: self.sold_volume,
            hedges_submitted: self.hedges_submitted,
            hedge_volume: self.hedge_volume,
            venue_errors: self.venue_errors,
            cash_flow: Decimal::from(self.cash_flow_units) * unit_value,
            fees: Decimal::from(self.fees_units) * unit_value,
        }
    }

    /// Output the session summary to logs.
    pub fn log_summary(&self, unit_value: Decimal) {
        let s = self.summary(unit_value);
        info!("========== Session Summary ==========");
        info!(
            "Period: {} ({}s)",
            s.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            s.duration_secs
        );
        info!(
            "  Market data: {} snapshots, {} trade prints, {} skipped",
            s.snapshots, s.trade_prints, s.skipped_events
        );
        info!(
            "  Quotes: {} submitted, {} cancels, {} rejects",
            s.quotes_submitted, s.cancels_requested, s.rejects
        );
        info!(
            "  Fills: {} (bought {}, sold {}), cash flow {}",
            s.fills, s.bought_volume, s.sold_volume, s.cash_flow
        );
        info!(
            "  Hedges: {} orders, {} lots",
            s.hedges_submitted, s.hedge_volume
        );
        info!("  Fees: {}, venue errors: {}", s.fees, s.venue_errors);
        info!("=====================================");
    }

    /// Summary as a JSON string.
    pub fn to_json(&self, unit_value: Decimal) -> TelemetryResult<String> {
        Ok(serde_json::to_string(&self.summary(unit_value))?)
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
