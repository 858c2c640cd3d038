//! Whole-share quantity value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::domain::shared::DomainError;

/// A count of whole shares or contracts.
///
/// Holdings and offer amounts are whole shares; fractional quantities do
/// not exist in OTC negotiation. Subtraction is checked so ledger
/// arithmetic can never wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareCount(u64);

impl ShareCount {
    /// Zero shares.
    pub const ZERO: Self = Self(0);

    /// Create a new share count.
    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    /// Get the inner count.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns true if the count is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn checked_add(self, rhs: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| DomainError::ArithmeticOverflow {
                operation: "share count addition".to_string(),
            })
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns error if `rhs` exceeds `self`.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, DomainError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or_else(|| DomainError::ArithmeticOverflow {
                operation: "share count subtraction".to_string(),
            })
    }

    /// Check the count is usable as an offer amount.
    ///
    /// # Errors
    ///
    /// Returns error if the count is zero.
    pub fn validate_for_offer(&self) -> Result<(), DomainError> {
        if self.is_zero() {
            return Err(DomainError::InvalidValue {
                field: "amount".to_string(),
                message: "Offer amount must be at least one share".to_string(),
            });
        }
        Ok(())
    }

    /// Convert to a Decimal for price arithmetic.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl fmt::Display for ShareCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for ShareCount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShareCount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<u64> for ShareCount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ShareCount> for u64 {
    fn from(value: ShareCount) -> Self {
        value.0
    }
}
