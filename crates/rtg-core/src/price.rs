//! Integer price and volume units.
//!
//! The venue quotes prices as whole units (cents) that must sit on a
//! multiple of the tick size. Model math runs in `f64`; the rounding
//! helpers here are the only way a float becomes a venue price again.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Limit price in venue units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(units: i64) -> Self {
        Self(units)
    }

    #[inline]
    pub fn units(&self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Whether the price sits exactly on a tick boundary.
    #[inline]
    pub fn is_tick_aligned(&self, tick_size: i64) -> bool {
        tick_size > 0 && self.0 % tick_size == 0
    }

    /// Largest tick-aligned price not above `value`.
    pub fn floor_to_tick(value: f64, tick_size: i64) -> Self {
        let ticks = (value / tick_size as f64).floor();
        Self(ticks as i64 * tick_size)
    }

    /// Smallest tick-aligned price not below `value`.
    pub fn ceil_to_tick(value: f64, tick_size: i64) -> Self {
        let ticks = (value / tick_size as f64).ceil();
        Self(ticks as i64 * tick_size)
    }

    /// Add a whole number of ticks.
    #[inline]
    pub fn offset_ticks(&self, ticks: i64, tick_size: i64) -> Self {
        Self(self.0 + ticks * tick_size)
    }

    /// Absolute distance to `other` in whole ticks.
    #[inline]
    pub fn ticks_from(&self, other: Price, tick_size: i64) -> i64 {
        if tick_size <= 0 {
            return 0;
        }
        (self.0 - other.0).abs() / tick_size
    }

    /// Convert to currency given the value of one price unit.
    #[inline]
    pub fn to_currency(&self, unit_value: Decimal) -> Decimal {
        Decimal::from(self.0) * unit_value
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order or level volume in lots.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Volume(pub u32);

impl Volume {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(lots: u32) -> Self {
        Self(lots)
    }

    #[inline]
    pub fn lots(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn as_i64(&self) -> i64 {
        i64::from(self.0)
    }

    #[inline]
    pub fn saturating_sub(&self, other: Volume) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Clamp a signed capacity into a volume (negative → zero).
    #[inline]
    pub fn from_capacity(capacity: i64) -> Self {
        Self(capacity.clamp(0, i64::from(u32::MAX)) as u32)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
