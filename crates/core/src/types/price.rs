//! Type-safe price representation using decimal arithmetic.
//!
//! Prices come from the inventory service as JSON numbers and are persisted
//! with the cart as decimal strings; both deserialize into the same value.
//!
//! Line and cart arithmetic saturates at [`Price::MAX`] instead of panicking.

use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit price in the store's currency.
///
/// The storefront only trades in one currency, so no currency code is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest representable price.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from the smallest currency unit (e.g. cents).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0.round_dp(2))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_cents() {
        assert_eq!(Price::from_cents(10_000).display(), "$100.00");
        assert_eq!(Price::new(Decimal::new(1399, 1)).to_string(), "$139.90");
    }

    #[test]
    fn test_deserializes_from_number_or_string() {
        let from_number: Price = serde_json::from_str("100").unwrap();
        let from_string: Price = serde_json::from_str("\"100.00\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_line_arithmetic() {
        let unit = Price::from_cents(1999);
        assert_eq!(unit * 3, Price::from_cents(5997));

        let total: Price = [unit, Price::from_cents(1)].into_iter().sum();
        assert_eq!(total, Price::from_cents(2000));
    }

    #[test]
    fn test_arithmetic_saturates() {
        assert_eq!(Price::MAX * 2, Price::MAX);
        assert_eq!(Price::MAX + Price::from_cents(1), Price::MAX);

        let total: Price = [Price::MAX, Price::MAX].into_iter().sum();
        assert_eq!(total, Price::MAX);
    }

    #[test]
    fn test_serializes_as_decimal_string() {
        let json = serde_json::to_string(&Price::from_cents(17_990)).unwrap();
        assert_eq!(json, "\"179.90\"");
    }
}
