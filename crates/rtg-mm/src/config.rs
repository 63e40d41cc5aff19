//! Market making configuration.

use rtg_core::{Instrument, Lifespan};
use rtg_position::TrackerLimits;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MmError, MmResult};

/// Which reference-instrument feed drives the volatility estimate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VolatilitySource {
    /// Mid of each order-book snapshot.
    #[default]
    Book,
    /// Mid of the best traded prices in each trade print.
    Trades,
}

/// Realized volatility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityConfig {
    /// Number of log-returns kept (FIFO).
    #[serde(default = "default_vol_window")]
    pub window: usize,

    /// Returns required before the estimate replaces the default.
    #[serde(default = "default_vol_min_samples")]
    pub min_samples: usize,

    /// Estimate used while warming up.
    #[serde(default = "default_volatility")]
    pub default_volatility: f64,

    /// Multiplier applied to the per-sample standard deviation
    /// (1.0 = per-update volatility, larger values annualize).
    #[serde(default = "default_vol_scale")]
    pub scale: f64,

    #[serde(default)]
    pub source: VolatilitySource,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            window: default_vol_window(),
            min_samples: default_vol_min_samples(),
            default_volatility: default_volatility(),
            scale: default_vol_scale(),
            source: VolatilitySource::default(),
        }
    }
}

/// Market making configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Instrument we quote.
    #[serde(default = "default_quoted")]
    pub quoted_instrument: Instrument,

    /// Instrument that supplies fair value and takes the hedges.
    #[serde(default = "default_reference")]
    pub reference_instrument: Instrument,

    /// Price increment in price units.
    #[serde(default = "default_tick_size")]
    pub tick_size: i64,

    /// Currency value of one price unit (reporting only).
    #[serde(default = "default_price_unit")]
    pub price_unit: Decimal,

    /// Lowest bid price the venue accepts.
    #[serde(default = "default_min_bid_price")]
    pub min_bid_price: i64,

    /// Highest ask price the venue accepts.
    #[serde(default = "default_max_ask_price")]
    pub max_ask_price: i64,

    /// Absolute position limit in lots.
    #[serde(default = "default_position_limit")]
    pub position_limit: i64,

    /// Maximum live quote orders.
    #[serde(default = "default_max_active_orders")]
    pub max_active_orders: usize,

    /// Quote size in lots.
    #[serde(default = "default_lot_size")]
    pub lot_size: u32,

    /// Quote size on the side that unwinds a position pinned at the limit.
    #[serde(default = "default_unwind_volume")]
    pub unwind_volume: u32,

    /// Risk aversion γ.
    #[serde(default = "default_risk_aversion")]
    pub risk_aversion: f64,

    /// Order-flow intensity κ.
    #[serde(default = "default_flow_intensity")]
    pub flow_intensity: f64,

    /// Minimum quoted spread as a percentage of mid.
    #[serde(default = "default_min_spread_pct")]
    pub min_spread_pct: f64,

    /// Session length used for the time-remaining factor τ.
    #[serde(default = "default_horizon_secs")]
    pub horizon_secs: u64,

    /// Age after which a live quote is cancelled. 0 disables.
    #[serde(default = "default_stale_order_ms")]
    pub stale_order_ms: u64,

    /// Price change (in ticks) that triggers cancel/replace of a resting quote.
    #[serde(default = "default_requote_threshold_ticks")]
    pub requote_threshold_ticks: i64,

    /// Cancel the remainder of a quote after a partial fill.
    #[serde(default)]
    pub cancel_on_fill: bool,

    /// Re-run reconcile with the last target as soon as a side goes idle.
    #[serde(default = "default_true")]
    pub requote_on_terminal: bool,

    #[serde(default)]
    pub quote_lifespan: Lifespan,

    #[serde(default)]
    pub volatility: VolatilityConfig,
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            quoted_instrument: default_quoted(),
            reference_instrument: default_reference(),
            tick_size: default_tick_size(),
            price_unit: default_price_unit(),
            min_bid_price: default_min_bid_price(),
            max_ask_price: default_max_ask_price(),
            position_limit: default_position_limit(),
            max_active_orders: default_max_active_orders(),
            lot_size: default_lot_size(),
            unwind_volume: default_unwind_volume(),
            risk_aversion: default_risk_aversion(),
            flow_intensity: default_flow_intensity(),
            min_spread_pct: default_min_spread_pct(),
            horizon_secs: default_horizon_secs(),
            stale_order_ms: default_stale_order_ms(),
            requote_threshold_ticks: default_requote_threshold_ticks(),
            cancel_on_fill: false,
            requote_on_terminal: true,
            quote_lifespan: Lifespan::default(),
            volatility: VolatilityConfig::default(),
        }
    }
}

impl MakerConfig {
    /// Reject parameter sets the model cannot run with.
    pub fn validate(&self) -> MmResult<()> {
        let fail = |msg: String| -> MmResult<()> { Err(MmError::InvalidConfig(msg)) };

        if self.quoted_instrument == self.reference_instrument {
            return fail("quoted and reference instrument must differ".into());
        }
        if self.tick_size <= 0 {
            return fail(format!("tick_size must be positive, got {}", self.tick_size));
        }
        if !(self.risk_aversion.is_finite() && self.risk_aversion > 0.0) {
            return fail(format!(
                "risk_aversion must be > 0, got {}",
                self.risk_aversion
            ));
        }
        if !(self.flow_intensity.is_finite() && self.flow_intensity > 0.0) {
            return fail(format!(
                "flow_intensity must be > 0, got {}",
                self.flow_intensity
            ));
        }
        if !(self.min_spread_pct.is_finite() && self.min_spread_pct >= 0.0) {
            return fail(format!(
                "min_spread_pct must be >= 0, got {}",
                self.min_spread_pct
            ));
        }
        if self.position_limit <= 0 {
            return fail("position_limit must be positive".into());
        }
        if self.lot_size == 0 {
            return fail("lot_size must be positive".into());
        }
        if self.max_active_orders == 0 {
            return fail("max_active_orders must be at least 1".into());
        }
        if self.min_bid_price < 0 || self.min_bid_price >= self.max_ask_price {
            return fail(format!(
                "venue bounds invalid: min_bid_price={} max_ask_price={}",
                self.min_bid_price, self.max_ask_price
            ));
        }
        let lowest_bid = ((self.min_bid_price + self.tick_size - 1) / self.tick_size * self.tick_size)
            .max(self.tick_size);
        let highest_ask = self.max_ask_price / self.tick_size * self.tick_size;
        if lowest_bid >= highest_ask {
            return fail(format!(
                "venue bounds {}..{} hold fewer than two ticks of {}",
                self.min_bid_price, self.max_ask_price, self.tick_size
            ));
        }
        let vol = &self.volatility;
        if vol.window < 2 {
            return fail("volatility.window must be at least 2".into());
        }
        if vol.min_samples < 2 || vol.min_samples > vol.window {
            return fail(format!(
                "volatility.min_samples must be in [2, {}], got {}",
                vol.window, vol.min_samples
            ));
        }
        if !(vol.default_volatility.is_finite() && vol.default_volatility >= 0.0) {
            return fail("volatility.default_volatility must be >= 0".into());
        }
        if !(vol.scale.is_finite() && vol.scale > 0.0) {
            return fail("volatility.scale must be > 0".into());
        }
        Ok(())
    }

    pub fn tracker_limits(&self) -> TrackerLimits {
        TrackerLimits {
            position_limit: self.position_limit,
            max_active_orders: self.max_active_orders,
        }
    }

    pub fn horizon_ms(&self) -> u64 {
        self.horizon_secs.saturating_mul(1000)
    }
}

fn default_true() -> bool {
    true
}
fn default_quoted() -> Instrument {
    Instrument::Etf
}
fn default_reference() -> Instrument {
    Instrument::Future
}
fn default_tick_size() -> i64 {
    100 // one cent-denominated tick = 100 units
}
fn default_price_unit() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_min_bid_price() -> i64 {
    1
}
fn default_max_ask_price() -> i64 {
    i64::from(i32::MAX)
}
fn default_position_limit() -> i64 {
    100
}
fn default_max_active_orders() -> usize {
    10
}
fn default_lot_size() -> u32 {
    10
}
fn default_unwind_volume() -> u32 {
    150 // position_limit + 50
}
fn default_risk_aversion() -> f64 {
    0.01
}
fn default_flow_intensity() -> f64 {
    0.2
}
fn default_min_spread_pct() -> f64 {
    0.02
}
fn default_horizon_secs() -> u64 {
    900
}
fn default_stale_order_ms() -> u64 {
    3_000
}
fn default_requote_threshold_ticks() -> i64 {
    1
}
fn default_vol_window() -> usize {
    200
}
fn default_vol_min_samples() -> usize {
    20
}
fn default_volatility() -> f64 {
    0.002
}
fn default_vol_scale() -> f64 {
    1.0
}
