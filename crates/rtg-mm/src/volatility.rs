//! Realized volatility from reference mid-price log-returns.
//!
//! Keeps a fixed-size FIFO of `ln(pₙ / pₙ₋₁)` and estimates
//! `sqrt(Σ r² / (n − 1)) × scale`. Until `min_samples` returns are buffered
//! the configured default is returned unchanged, so quoting works from the
//! first snapshot.

use std::collections::VecDeque;

use crate::config::VolatilityConfig;

/// Rolling realized-volatility estimator.
#[derive(Debug, Clone)]
pub struct VolatilityEstimator {
    returns: VecDeque<f64>,
    capacity: usize,
    min_samples: usize,
    default_volatility: f64,
    scale: f64,
    last_price: Option<f64>,
}

impl VolatilityEstimator {
    pub fn new(capacity: usize, min_samples: usize, default_volatility: f64, scale: f64) -> Self {
        let capacity = capacity.max(2);
        Self {
            returns: VecDeque::with_capacity(capacity),
            capacity,
            min_samples: min_samples.max(2),
            default_volatility,
            scale,
            last_price: None,
        }
    }

    pub fn from_config(config: &VolatilityConfig) -> Self {
        Self::new(
            config.window,
            config.min_samples,
            config.default_volatility,
            config.scale,
        )
    }

    /// Feed a new mid price.
    ///
    /// Non-positive or non-finite prices are ignored and do not replace the
    /// previous price. Returns true when a new return was buffered.
    pub fn observe(&mut self, price: f64) -> bool {
        if !(price.is_finite() && price > 0.0) {
            return false;
        }
        let Some(prev) = self.last_price.replace(price) else {
            return false;
        };
        let ret = (price / prev).ln();
        if !ret.is_finite() {
            return false;
        }
        if self.returns.len() == self.capacity {
            self.returns.pop_front();
        }
        self.returns.push_back(ret);
        true
    }

    /// Current volatility estimate.
    pub fn estimate(&self) -> f64 {
        let n = self.returns.len();
        if n < self.min_samples {
            return self.default_volatility;
        }
        let sum_sq: f64 = self.returns.iter().map(|r| r * r).sum();
        (sum_sq / (n - 1) as f64).sqrt() * self.scale
    }

    /// Enough returns buffered for a measured estimate.
    pub fn is_warm(&self) -> bool {
        self.returns.len() >= self.min_samples
    }

    pub fn sample_count(&self) -> usize {
        self.returns.len()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }
}
