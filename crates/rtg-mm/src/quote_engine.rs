//! Avellaneda–Stoikov quote calculation.
//!
//! Computes the reservation price and optimal spread from:
//! - Reference mid price `m` (price units)
//! - Signed inventory `q` (lots)
//! - Volatility `σ`, risk aversion `γ`, flow intensity `κ`
//! - Time remaining `τ ∈ [0, 1]`
//!
//! ```text
//! r = m − q·γ·σ²·τ·tick
//! δ = (γ·σ²·τ + (2/γ)·ln(1 + γ/κ))·tick
//! ```
//!
//! Bid is floored and ask ceiled to the tick grid, then both are pushed out
//! to at least `min_spread_pct` of mid and held inside the venue's price
//! bounds. The result is always a valid pair: tick-aligned, bid strictly
//! below ask, both within `[min_bid_price, max_ask_price]`.

use rtg_core::Price;

use crate::config::MakerConfig;

/// Model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteParams {
    pub risk_aversion: f64,
    pub flow_intensity: f64,
    pub tick_size: i64,
    pub min_spread_pct: f64,
    /// Lowest bid the venue accepts.
    pub min_bid_price: i64,
    /// Highest ask the venue accepts.
    pub max_ask_price: i64,
}

impl QuoteParams {
    pub fn from_config(config: &MakerConfig) -> Self {
        Self {
            risk_aversion: config.risk_aversion,
            flow_intensity: config.flow_intensity,
            tick_size: config.tick_size,
            min_spread_pct: config.min_spread_pct,
            min_bid_price: config.min_bid_price,
            max_ask_price: config.max_ask_price,
        }
    }
}

/// Per-cycle model inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteInputs {
    pub mid: f64,
    pub inventory: i64,
    pub volatility: f64,
    pub time_remaining: f64,
}

/// Desired quotes for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteTarget {
    pub reservation_price: f64,
    /// Optimal spread in price units.
    pub spread: f64,
    pub bid: Price,
    pub ask: Price,
}

/// Fraction of the session left, clamped to `[0, 1]`.
pub fn time_remaining(elapsed_ms: u64, horizon_ms: u64) -> f64 {
    if horizon_ms == 0 {
        return 0.0;
    }
    let left = 1.0 - elapsed_ms as f64 / horizon_ms as f64;
    left.clamp(0.0, 1.0)
}

/// Compute the quote pair.
///
/// Returns `None` when `mid` is not a positive finite number or the venue
/// bounds leave no room for two ticks.
/// A non-finite or negative volatility is treated as zero.
pub fn compute_quotes(inputs: &QuoteInputs, params: &QuoteParams) -> Option<QuoteTarget> {
    let mid = inputs.mid;
    if !(mid.is_finite() && mid > 0.0) {
        return None;
    }

    let tick_size = params.tick_size.max(1);
    let tick = tick_size as f64;
    let gamma = params.risk_aversion;
    let kappa = params.flow_intensity;
    let sigma = if inputs.volatility.is_finite() {
        inputs.volatility.max(0.0)
    } else {
        0.0
    };
    let tau = if inputs.time_remaining.is_finite() {
        inputs.time_remaining.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let variance_term = gamma * sigma * sigma * tau;

    let reservation_price = mid - inputs.inventory as f64 * variance_term * tick;
    let spread = (variance_term + (2.0 / gamma) * (1.0 + gamma / kappa).ln()) * tick;

    let raw_bid = Price::floor_to_tick(reservation_price - spread / 2.0, tick_size);
    let raw_ask = Price::ceil_to_tick(reservation_price + spread / 2.0, tick_size);

    // Minimum spread band around mid.
    let floor_spread = mid * params.min_spread_pct.max(0.0) / 100.0;
    let band_bid = Price::floor_to_tick(mid - floor_spread / 2.0, tick_size);
    let band_ask = Price::ceil_to_tick(mid + floor_spread / 2.0, tick_size);

    let lowest_bid =
        Price::ceil_to_tick(params.min_bid_price as f64, tick_size).max(Price(tick_size));
    let highest_ask = Price::floor_to_tick(params.max_ask_price as f64, tick_size);
    if lowest_bid >= highest_ask {
        return None;
    }

    let bid = raw_bid
        .min(band_bid)
        .max(lowest_bid)
        .min(highest_ask.offset_ticks(-1, tick_size));
    let ask = raw_ask
        .max(band_ask)
        .max(bid.offset_ticks(1, tick_size))
        .min(highest_ask);

    Some(QuoteTarget {
        reservation_price,
        spread,
        bid,
        ask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> QuoteParams {
        QuoteParams {
            risk_aversion: 0.01,
            flow_intensity: 0.2,
            tick_size: 100,
            min_spread_pct: 0.02,
            min_bid_price: 1,
            max_ask_price: i64::from(i32::MAX),
        }
    }

    fn inputs(inventory: i64) -> QuoteInputs {
        QuoteInputs {
            mid: 10_000.0,
            inventory,
            volatility: 0.002,
            time_remaining: 1.0,
        }
    }

    #[test]
    fn test_golden_values() {
        let q = compute_quotes(&inputs(0), &params()).unwrap();

        let expected_spread = (0.01 * 0.002 * 0.002 * 1.0 + (2.0 / 0.01) * (1.0f64 + 0.01 / 0.2).ln())
            * 100.0;
        assert_eq!(q.reservation_price, 10_000.0);
        assert!((q.spread - expected_spread).abs() < 1e-9);
        assert!((q.spread - 975.8033).abs() < 1e-3);
        assert_eq!(q.bid, Price(9_500));
        assert_eq!(q.ask, Price(10_500));
    }

    #[test]
    fn test_inventory_skews_reservation_price() {
        let p = QuoteParams {
            risk_aversion: 0.1,
            ..params()
        };
        let mut high_vol = inputs(50);
        high_vol.volatility = 0.5;
        let long = compute_quotes(&high_vol, &p).unwrap();
        high_vol.inventory = -50;
        let short = compute_quotes(&high_vol, &p).unwrap();

        // 50 * 0.1 * 0.25 * 1 * 100
        assert!((long.reservation_price - (10_000.0 - 125.0)).abs() < 1e-9);
        assert!((short.reservation_price - (10_000.0 + 125.0)).abs() < 1e-9);
        assert!(long.bid <= short.bid);
        assert!(long.ask <= short.ask);
    }

    #[test]
    fn test_min_spread_floor_widens_tight_quotes() {
        let p = QuoteParams {
            risk_aversion: 1.0,
            flow_intensity: 1_000.0,
            min_spread_pct: 5.0,
            ..params()
        };
        let q = compute_quotes(&inputs(0), &p).unwrap();
        // Model spread ~0.2 units, floor is 500 units → band [9750, 10250] on ticks.
        assert_eq!(q.bid, Price(9_700));
        assert_eq!(q.ask, Price(10_300));
    }

    #[test]
    fn test_zero_time_remaining_removes_skew() {
        let mut i = inputs(80);
        i.time_remaining = 0.0;
        let q = compute_quotes(&i, &params()).unwrap();
        assert_eq!(q.reservation_price, 10_000.0);

        i.time_remaining = -3.0;
        let clamped = compute_quotes(&i, &params()).unwrap();
        assert_eq!(clamped, q);
    }

    #[test]
    fn test_invalid_mid_returns_none() {
        for mid in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let i = QuoteInputs { mid, ..inputs(0) };
            assert!(compute_quotes(&i, &params()).is_none());
        }
    }

    #[test]
    fn test_non_finite_volatility_treated_as_zero() {
        let mut i = inputs(10);
        i.volatility = f64::NAN;
        let q = compute_quotes(&i, &params()).unwrap();
        assert_eq!(q.reservation_price, 10_000.0);
        assert!(q.bid < q.ask);
    }

    #[test]
    fn test_quotes_valid_across_parameter_grid() {
        let gammas = [0.001, 0.01, 0.1, 1.0, 5.0];
        let kappas = [0.01, 0.2, 1.5, 100.0];
        let sigmas = [0.0, 0.0001, 0.002, 0.05, 0.5];
        let taus = [0.0, 0.25, 1.0];
        let mids = [150.0, 10_000.0, 250_000.0];

        for &gamma in &gammas {
            for &kappa in &kappas {
                let p = QuoteParams {
                    risk_aversion: gamma,
                    flow_intensity: kappa,
                    ..params()
                };
                for &volatility in &sigmas {
                    for &time_remaining in &taus {
                        for &mid in &mids {
                            for inventory in (-100..=100).step_by(25) {
                                let i = QuoteInputs {
                                    mid,
                                    inventory,
                                    volatility,
                                    time_remaining,
                                };
                                let q = compute_quotes(&i, &p).unwrap();
                                assert!(q.bid < q.ask, "{i:?} {p:?} -> {q:?}");
                                assert!(q.bid.is_positive());
                                assert!(q.bid.is_tick_aligned(100));
                                assert!(q.ask.is_tick_aligned(100));
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_reservation_price_non_increasing_in_inventory() {
        let p = QuoteParams {
            risk_aversion: 0.5,
            ..params()
        };
        for &volatility in &[0.0, 0.002, 0.3] {
            let mut prev = f64::INFINITY;
            let mut prev_bid = Price(i64::MAX);
            for inventory in -100..=100 {
                let i = QuoteInputs {
                    volatility,
                    ..inputs(inventory)
                };
                let q = compute_quotes(&i, &p).unwrap();
                assert!(q.reservation_price <= prev);
                assert!(q.bid <= prev_bid);
                prev = q.reservation_price;
                prev_bid = q.bid;
            }
        }
    }

    #[test]
    fn test_quotes_held_inside_venue_bounds() {
        let p = QuoteParams {
            min_bid_price: 9_800,
            max_ask_price: 10_150,
            ..params()
        };
        let q = compute_quotes(&inputs(0), &p).unwrap();
        assert_eq!(q.bid, Price(9_800));
        assert_eq!(q.ask, Price(10_100));

        // Mid above the ask cap still leaves a valid pair at the top.
        let high = QuoteInputs {
            mid: 2_147_483_000.0,
            ..inputs(0)
        };
        let q = compute_quotes(&high, &params()).unwrap();
        assert_eq!(q.ask, Price(2_147_483_600));
        assert!(q.bid < q.ask);

        // Tiny mid: bid lifted to the first tick at or above the floor.
        let low = QuoteInputs {
            mid: 150.0,
            ..inputs(0)
        };
        let p = QuoteParams {
            min_bid_price: 150,
            ..params()
        };
        let q = compute_quotes(&low, &p).unwrap();
        assert_eq!(q.bid, Price(200));
        assert_eq!(q.ask, Price(700));
    }

    #[test]
    fn test_bounds_without_two_ticks_return_none() {
        let p = QuoteParams {
            min_bid_price: 9_950,
            max_ask_price: 10_050,
            ..params()
        };
        assert!(compute_quotes(&inputs(0), &p).is_none());
    }

    #[test]
    fn test_time_remaining() {
        assert_eq!(time_remaining(0, 900_000), 1.0);
        assert_eq!(time_remaining(450_000, 900_000), 0.5);
        assert_eq!(time_remaining(2_000_000, 900_000), 0.0);
        assert_eq!(time_remaining(10, 0), 0.0);
    }
}
