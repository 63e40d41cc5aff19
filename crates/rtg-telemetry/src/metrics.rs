//! Prometheus metrics for the market maker.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means duplicate metric
//! names, which is a build-time mistake; it can only panic during static
//! initialization, never while handling events.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, register_int_counter,
    register_int_gauge, CounterVec, Encoder, Gauge, Histogram, IntCounter, IntGauge,
    TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Market-data events processed, by instrument and kind.
pub static MARKET_EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rtg_market_events_total",
        "Market data events processed",
        &["instrument", "kind"]
    )
    .unwrap()
});

/// Market-data events skipped, by reason (malformed book state or duplicate).
pub static MARKET_EVENTS_SKIPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rtg_market_events_skipped_total",
        "Market data events skipped without a quoting decision",
        &["instrument", "reason"]
    )
    .unwrap()
});

/// Quote orders submitted.
pub static QUOTES_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rtg_quotes_submitted_total",
        "Quote orders submitted",
        &["side"]
    )
    .unwrap()
});

/// Quote cancels requested.
/// Labels: reason (reprice/stale/fill)
pub static QUOTES_CANCELLED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rtg_quotes_cancel_requested_total",
        "Quote cancels requested",
        &["side", "reason"]
    )
    .unwrap()
});

/// Terminal order outcomes.
/// Labels: outcome (rejected/cancelled/partial_then_cancelled)
pub static ORDER_TERMINAL_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rtg_order_terminal_total",
        "Quote orders leaving the book without a full fill",
        &["outcome"]
    )
    .unwrap()
});

/// Quote fill volume.
pub static FILL_VOLUME_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rtg_fill_volume_total",
        "Quote volume filled",
        &["side"]
    )
    .unwrap()
});

/// Hedge volume sent.
pub static HEDGE_VOLUME_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rtg_hedge_volume_total",
        "Hedge volume submitted on the reference instrument",
        &["side"]
    )
    .unwrap()
});

/// Venue error messages received.
pub static VENUE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("rtg_venue_errors_total", "Error messages from the venue").unwrap()
});

/// Fees charged (negative = rebates), in price units.
pub static FEES_TOTAL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("rtg_fees_total", "Cumulative fees in price units").unwrap()
});

/// Current realized volatility estimate.
pub static VOLATILITY: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("rtg_volatility", "Realized volatility estimate").unwrap()
});

/// Last reservation price.
pub static RESERVATION_PRICE: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("rtg_reservation_price", "Last reservation price").unwrap()
});

/// Last optimal spread in price units.
pub static OPTIMAL_SPREAD: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("rtg_optimal_spread", "Last optimal spread in price units").unwrap()
});

/// Theoretical inventory (confirmed plus in-flight).
pub static THEORETICAL_POSITION: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "rtg_theoretical_position",
        "Confirmed position plus in-flight quote volume"
    )
    .unwrap()
});

/// Confirmed inventory.
pub static CONFIRMED_POSITION: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("rtg_confirmed_position", "Position from venue fills").unwrap()
});

/// Hedge position on the reference instrument.
pub static HEDGE_POSITION: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "rtg_hedge_position",
        "Filled hedge position on the reference instrument"
    )
    .unwrap()
});

/// Live quote orders.
pub static ACTIVE_ORDERS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("rtg_active_orders", "Live quote orders").unwrap()
});

/// Event handling time in microseconds.
pub static EVENT_HANDLE_US: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "rtg_event_handle_us",
        "Time spent handling one inbound event in microseconds",
        vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0]
    )
    .unwrap()
});

/// Metrics helper.
pub struct Metrics;

impl Metrics {
    /// Record a market-data event handled.
    pub fn market_event(instrument: &str, kind: &str) {
        MARKET_EVENTS_TOTAL
            .with_label_values(&[instrument, kind])
            .inc();
    }

    /// Record a market-data event skipped.
    pub fn market_event_skipped(instrument: &str, reason: &str) {
        MARKET_EVENTS_SKIPPED_TOTAL
            .with_label_values(&[instrument, reason])
            .inc();
    }

    pub fn quote_submitted(side: &str) {
        QUOTES_SUBMITTED_TOTAL.with_label_values(&[side]).inc();
    }

    pub fn quote_cancel_requested(side: &str, reason: &str) {
        QUOTES_CANCELLED_TOTAL
            .with_label_values(&[side, reason])
            .inc();
    }

    pub fn order_terminal(outcome: &str) {
        ORDER_TERMINAL_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn quote_filled(side: &str, volume: u32) {
        FILL_VOLUME_TOTAL
            .with_label_values(&[side])
            .inc_by(f64::from(volume));
    }

    pub fn hedge_submitted(side: &str, volume: u32) {
        HEDGE_VOLUME_TOTAL
            .with_label_values(&[side])
            .inc_by(f64::from(volume));
    }

    pub fn venue_error() {
        VENUE_ERRORS_TOTAL.inc();
    }

    pub fn fees(amount: i64) {
        FEES_TOTAL.add(amount as f64);
    }

    /// Record the model state of one quoting cycle.
    pub fn quote_model(volatility: f64, reservation_price: f64, spread: f64) {
        VOLATILITY.set(volatility);
        RESERVATION_PRICE.set(reservation_price);
        OPTIMAL_SPREAD.set(spread);
    }

    pub fn inventory(theoretical: i64, confirmed: i64, active_orders: usize) {
        THEORETICAL_POSITION.set(theoretical);
        CONFIRMED_POSITION.set(confirmed);
        ACTIVE_ORDERS.set(active_orders as i64);
    }

    pub fn hedge_position(position: i64) {
        HEDGE_POSITION.set(position);
    }

    pub fn event_handled(elapsed_us: f64) {
        EVENT_HANDLE_US.observe(elapsed_us);
    }

    /// Render the default registry in the Prometheus text format.
    pub fn encode_text() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
