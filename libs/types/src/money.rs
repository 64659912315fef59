//! Fixed-point decimal price type
//!
//! All monetary values use `rust_decimal` for deterministic arithmetic.
//! Prices are strictly positive and normalized to two decimal places on
//! construction; totals round half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places carried by every price and total.
pub const MONEY_SCALE: u32 = 2;

/// A strictly positive per-item price, normalized to two decimal places.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal value.
    ///
    /// Returns `None` unless the value is strictly positive. The value is
    /// rounded to [`MONEY_SCALE`] decimal places, half away from zero.
    pub fn new(value: Decimal) -> Option<Self> {
        if value <= Decimal::ZERO {
            return None;
        }
        Some(Self(value.round_dp_with_strategy(
            MONEY_SCALE,
            RoundingStrategy::MidpointAwayFromZero,
        )))
    }

    /// Create a price from a whole number of currency units.
    ///
    /// # Panics
    /// Panics if `value` is zero.
    pub fn from_u64(value: u64) -> Self {
        assert!(value > 0, "Price must be positive");
        Self(Decimal::from(value))
    }

    /// Get the inner decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Total value for `quantity` items at this price, rounded to
    /// [`MONEY_SCALE`] decimal places half away from zero.
    pub fn total(&self, quantity: u32) -> Decimal {
        (self.0 * Decimal::from(quantity))
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s)?;
        Price::new(value).ok_or(rust_decimal::Error::LessThanMinimumPossibleValue)
    }
}
