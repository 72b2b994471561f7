//! Fixed-point price representation using decimal arithmetic.
//!
//! All marketplace prices are in Ethiopian birr with two decimal places,
//! matching the `NUMERIC(10, 2)` columns they are stored in.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in birr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Number of decimal places stored for every price.
    pub const SCALE: u32 = 2;

    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rounding to two decimal places.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Create a price from a whole number of cents (santim).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, Self::SCALE))
    }

    /// The largest amount a `NUMERIC(10, 2)` column holds.
    #[must_use]
    pub fn max_storable() -> Self {
        Self(Decimal::new(99_999_999_99, Self::SCALE))
    }

    /// Whether the amount fits a `NUMERIC(10, 2)` column.
    #[must_use]
    pub fn is_storable(&self) -> bool {
        *self <= Self::max_storable()
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// The price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display, e.g. `Br 1,234.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if self.is_negative() { "-" } else { "" };
        format!("{sign}Br {grouped}.{fraction}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
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

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times() {
        assert_eq!(Price::from_cents(10_000).times(2), Price::from_cents(20_000));
        assert_eq!(Price::from_cents(1_999).times(0), Price::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(150), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(400));
    }

    #[test]
    fn test_storable_limit() {
        assert!(Price::from_cents(99_999_999_99).is_storable());
        assert!(!Price::from_cents(99_999_999_99).times(2).is_storable());
    }

    #[test]
    fn test_new_rounds_to_cents() {
        assert_eq!(Price::new(Decimal::new(12_345, 3)), Price::from_cents(1_235));
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_cents(2_500_000).display(), "Br 25,000.00");
        assert_eq!(Price::from_cents(50_050).display(), "Br 500.50");
        assert_eq!(Price::from_cents(5).display(), "Br 0.05");
        assert_eq!(Price::from_cents(123_456_789).display(), "Br 1,234,567.89");
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_cents(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
    }
}
