//! Type-safe price representation using decimal arithmetic.
//!
//! The backend serializes prices as plain JSON numbers (`9.99`), so [`Price`]
//! uses `rust_decimal`'s float serde adapter rather than the string form.
//! Decimal arithmetic keeps line totals exact: `9.99 × 2` is `19.98`, not
//! `19.980000000000004`.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// A unit price in the shop's single display currency (USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units at this price.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), std::ops::Add::add)
    }
}

impl From<f64> for Price {
    fn from(amount: f64) -> Self {
        Self(Decimal::from_f64(amount).unwrap_or_default())
    }
}

impl std::fmt::Display for Price {
    /// Formats as `$9.99` with exactly two decimal places.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0.round_dp(2))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(Price::from_cents(999).to_string(), "$9.99");
        assert_eq!(Price::from_cents(100_000).to_string(), "$1000.00");
        assert_eq!(Price::from(29.9).to_string(), "$29.90");
    }

    #[test]
    fn test_line_total_is_exact() {
        let unit = Price::from_cents(999);
        assert_eq!(unit.line_total(2).to_string(), "$19.98");
        assert_eq!(unit.line_total(0).to_string(), "$0.00");
    }

    #[test]
    fn test_sum_over_lines() {
        let total: Price = [Price::from_cents(999).line_total(2), Price::from_cents(2999)]
            .into_iter()
            .sum();
        assert_eq!(total.to_string(), "$49.97");
    }

    #[test]
    fn test_serde_json_number() {
        let price: Price = serde_json::from_str("9.99").unwrap();
        assert_eq!(price, Price::from_cents(999));

        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "9.99");
    }
}
