//! Money value object for currency amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use crate::domain::shared::DomainError;

/// A monetary amount in the platform's settlement currency.
///
/// Represented as a Decimal for precise financial calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Create a new Money value from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money value from whole currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a Money value from cents (integer).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this amount is positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if this amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    /// Round to 2 decimal places.
    #[must_use]
    pub fn round(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Check the amount is usable for a payment dispatch.
    ///
    /// # Errors
    ///
    /// Returns error if the amount is zero or negative.
    pub fn validate_for_payment(&self) -> Result<(), DomainError> {
        if !self.is_positive() {
            return Err(DomainError::InvalidValue {
                field: "money".to_string(),
                message: "Payment amount must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Mul<u64> for Money {
    type Output = Self;

    fn mul(self, rhs: u64) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_new_and_display() {
        let m = Money::new(dec!(150.50));
        assert_eq!(format!("{m}"), "150.50");
    }

    #[test]
    fn money_from_units() {
        let m = Money::from_units(100);
        assert_eq!(m.amount(), Decimal::from(100));
    }

    #[test]
    fn money_from_cents() {
        let m = Money::from_cents(15050);
        assert_eq!(m.amount(), Decimal::new(15050, 2));
    }

    #[test]
    fn money_zero() {
        assert!(Money::ZERO.is_zero());
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
    }

    #[test]
    fn money_arithmetic() {
        let a = Money::from_units(100);
        let b = Money::from_units(50);

        assert_eq!((a + b).amount(), Decimal::from(150));
        assert_eq!((a - b).amount(), Decimal::from(50));
    }

    #[test]
    fn money_multiply_by_shares() {
        let strike = Money::from_units(100);
        assert_eq!((strike * 2u64).amount(), Decimal::from(200));
    }

    #[test]
    fn money_weighted_average() {
        // (10 * 4 + 20 * 6) / 10 = 16
        let total = Money::from_units(10) * 4u64 + Money::from_units(20) * 6u64;
        let avg = total / Decimal::from(10);
        assert_eq!(avg.amount(), Decimal::from(16));
    }

    #[test]
    fn money_ordering() {
        let a = Money::from_units(100);
        let b = Money::from_units(50);

        assert!(a > b);
        assert!(b < a);
        assert_eq!(a, Money::from_units(100));
    }

    #[test]
    fn money_round() {
        let m = Money::new(dec!(150.555));
        assert_eq!(m.round().amount(), dec!(150.56));
    }

    #[test]
    fn money_validate_for_payment_rejects_zero() {
        assert!(Money::ZERO.validate_for_payment().is_err());
    }

    #[test]
    fn money_validate_for_payment_rejects_negative() {
        let m = Money::from_units(-5);
        assert!(m.validate_for_payment().is_err());
    }

    #[test]
    fn money_validate_for_payment_accepts_positive() {
        assert!(Money::from_units(5).validate_for_payment().is_ok());
    }

    #[test]
    fn money_serde_roundtrip() {
        let m = Money::from_cents(15050);
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn money_default_is_zero() {
        assert!(Money::default().is_zero());
    }
}
