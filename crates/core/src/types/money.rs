//! Integer-cent money arithmetic.
//!
//! All checkout math happens in cents to avoid floating-point drift between
//! what the payment provider charges and what gets persisted. Catalog prices
//! are stored as `Decimal` dollars; each line is rounded to cents before any
//! aggregate discount is applied.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount of money in integer cents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Create from a cent amount.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a decimal dollar price to cents, rounding halves away from zero
    /// (the same rounding the provider applies to unit amounts).
    ///
    /// Returns `None` when the price does not fit in an `i64` cent amount.
    #[must_use]
    pub fn from_price(price: Decimal) -> Option<Self> {
        let cents = (price * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        cents.to_i64().map(Self)
    }

    /// The raw cent amount.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Multiply a unit amount by a line quantity.
    #[must_use]
    pub const fn times(&self, quantity: i64) -> Self {
        Self(self.0 * quantity)
    }

    /// Apply a percentage discount to this amount, rounding the discount to
    /// whole cents (half up) before subtracting.
    #[must_use]
    pub const fn apply_discount_percent(&self, percentage: i64) -> Self {
        let discount = (self.0 * percentage + 50) / 100;
        Self(self.0 - discount)
    }

    /// The amount in decimal dollars (for API responses and persistence).
    #[must_use]
    pub fn as_dollars(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.as_dollars())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_price_exact() {
        let m = Money::from_price(Decimal::new(1999, 2)).unwrap();
        assert_eq!(m.cents(), 1999);
    }

    #[test]
    fn test_from_price_rounds_half_up() {
        // 19.995 dollars -> 1999.5 cents -> 2000
        let m = Money::from_price(Decimal::new(19995, 3)).unwrap();
        assert_eq!(m.cents(), 2000);
    }

    #[test]
    fn test_times() {
        assert_eq!(Money::from_cents(250).times(3).cents(), 750);
    }

    #[test]
    fn test_ten_percent_discount() {
        // Subtotal of 1000 cents with a 10% coupon yields 900.
        let discounted = Money::from_cents(1000).apply_discount_percent(10);
        assert_eq!(discounted.cents(), 900);
    }

    #[test]
    fn test_discount_rounds_to_whole_cents() {
        // 15% of 333 is 49.95 -> rounds to 50.
        let discounted = Money::from_cents(333).apply_discount_percent(15);
        assert_eq!(discounted.cents(), 283);
    }

    #[test]
    fn test_as_dollars() {
        assert_eq!(Money::from_cents(12345).as_dollars(), Decimal::new(12345, 2));
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1999).to_string(), "$19.99");
    }
}
