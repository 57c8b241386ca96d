//! Type-safe price representation using decimal arithmetic.
//!
//! Menu prices arrive as JSON numbers (`12.99`) or strings and are held as
//! [`Decimal`] so that cart totals are exact. Prices are written as strings
//! (`"12.99"`), so persisted carts and orders read back without float drift.
//! A `Price` is never negative.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative amount in the store's currency.
///
/// ## Examples
///
/// ```
/// use bistro_core::Price;
///
/// let price = Price::from_cents(1099);
/// assert_eq!(price.times(3), Price::from_cents(3297));
/// assert_eq!(price.to_string(), "$10.99");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// This price scaled by a non-negative rate (e.g. a tax rate), rounded to cents.
    #[must_use]
    pub fn scaled(&self, rate: Decimal) -> Self {
        let scaled = (self.0 * rate.max(Decimal::ZERO))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self(scaled)
    }

    /// This price rounded to whole cents.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Whether the price is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.rounded().0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::new(dec("-0.01")),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_times_and_sum_are_exact() {
        let total: Price = [Price::from_cents(1000).times(3), Price::from_cents(550)]
            .into_iter()
            .sum();
        assert_eq!(total.amount(), dec("35.50"));
    }

    #[test]
    fn test_scaled_rounds_half_away_from_zero() {
        // 0.125 rounds up to 0.13, not to the even 0.12
        let price = Price::new(dec("1.5625")).unwrap();
        assert_eq!(price.scaled(dec("0.08")).amount(), dec("0.13"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(599).to_string(), "$5.99");
        assert_eq!(Price::new(dec("12.5")).unwrap().to_string(), "$12.50");
    }

    #[test]
    fn test_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("12.99").unwrap();
        assert_eq!(price, Price::from_cents(1299));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-3.5").is_err());
    }

    #[test]
    fn test_serializes_as_exact_string() {
        let price = Price::from_cents(1099);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"10.99\"");

        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
