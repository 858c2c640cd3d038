//! Value objects for the negotiation context.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{DomainError, Money, SettlementDate, ShareCount};

/// Lifecycle status of an OTC offer.
///
/// REJECTED, CANCELLED, and EXERCISED are terminal; ACCEPTED offers are
/// owned by the premium payment saga until its callback resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    /// Awaiting the counterparty's move.
    Pending,
    /// Accepted; premium payment in flight or settled.
    Accepted,
    /// Declined by the counterparty. Terminal.
    Rejected,
    /// Withdrawn by the author of the latest terms. Terminal.
    Cancelled,
    /// The resulting option was exercised. Terminal.
    Exercised,
}

impl OfferStatus {
    /// Whether the offer can still change state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled | Self::Exercised)
    }

    /// Whether the offer is open for negotiation moves.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Exercised => "EXERCISED",
        };
        write!(f, "{s}")
    }
}

/// The economic terms of an offer: what is traded, at what price, for
/// what premium, until when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferTerms {
    /// Number of shares covered by the option.
    pub amount: ShareCount,
    /// Per-share price paid on exercise (strike).
    pub price_per_share: Money,
    /// Up-front payment for acquiring the option.
    pub premium: Money,
    /// Last date on which the option may be exercised.
    pub settlement_date: SettlementDate,
}

impl OfferTerms {
    /// Validate the terms.
    ///
    /// # Errors
    ///
    /// Returns error if the amount is zero or either price is not positive.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.amount.validate_for_offer()?;
        if !self.price_per_share.is_positive() {
            return Err(DomainError::InvalidValue {
                field: "price_per_share".to_string(),
                message: "Price per share must be positive".to_string(),
            });
        }
        if !self.premium.is_positive() {
            return Err(DomainError::InvalidValue {
                field: "premium".to_string(),
                message: "Premium must be positive".to_string(),
            });
        }
        Ok(())
    }
}
