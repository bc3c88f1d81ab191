//! Whole-unit price representation.
//!
//! Catalog prices are integers in the store currency (euros), with no
//! minor unit. Line totals are computed with saturating arithmetic so a
//! pathological quantity cannot wrap.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// A price in whole currency units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(0);

    /// The largest representable price.
    pub const MAX: Self = Self(u64::MAX);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Get the amount in whole units.
    #[must_use]
    pub const fn amount(self) -> u64 {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "€{}", self.0)
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| Self(acc.0.saturating_add(p.0)))
    }
}

/// An inclusive price window used for filtering.
///
/// The default window spans every representable price, so a default
/// window never excludes anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceWindow {
    /// Lowest accepted price.
    pub min: Price,
    /// Highest accepted price.
    pub max: Price,
}

impl PriceWindow {
    /// The slider range the product listing starts from.
    pub const DEFAULT_UI: Self = Self {
        min: Price::new(500),
        max: Price::new(3000),
    };

    /// Window covering every price.
    pub const FULL: Self = Self {
        min: Price::ZERO,
        max: Price::MAX,
    };

    /// Create a window from whole-unit bounds.
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self {
            min: Price::new(min),
            max: Price::new(max),
        }
    }

    /// Whether `price` lies within the window, bounds included.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        self.min <= price && price <= self.max
    }
}

impl Default for PriceWindow {
    fn default() -> Self {
        Self::FULL
    }
}
