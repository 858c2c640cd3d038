//! Portfolio errors.

use std::fmt;

/// Errors that can occur in portfolio bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioError {
    /// Portfolio entry not found.
    EntryNotFound {
        /// Entry reference (id or "user/symbol").
        reference: String,
    },

    /// Requested amount exceeds the publicly offered quantity.
    InvalidPublicAmount {
        /// Requested shares.
        requested: u64,
        /// Publicly offered shares.
        public: u64,
    },

    /// Public holdings are insufficient to reserve.
    AmountNotEnough {
        /// Requested shares.
        requested: u64,
        /// Available shares.
        available: u64,
    },

    /// Reserved holdings are insufficient to release or transfer.
    ReservedNotEnough {
        /// Requested shares.
        requested: u64,
        /// Reserved shares.
        reserved: u64,
    },

    /// The `public + reserved ≤ amount` invariant would be violated.
    InvariantViolation {
        /// Total owned shares.
        amount: u64,
        /// Public shares.
        public: u64,
        /// Reserved shares.
        reserved: u64,
    },
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryNotFound { reference } => {
                write!(f, "Portfolio entry not found: {reference}")
            }
            Self::InvalidPublicAmount { requested, public } => {
                write!(
                    f,
                    "Requested {requested} shares but only {public} are public"
                )
            }
            Self::AmountNotEnough {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Cannot reserve {requested} shares: only {available} available"
                )
            }
            Self::ReservedNotEnough {
                requested,
                reserved,
            } => {
                write!(
                    f,
                    "Cannot release {requested} shares: only {reserved} reserved"
                )
            }
            Self::InvariantViolation {
                amount,
                public,
                reserved,
            } => {
                write!(
                    f,
                    "Holdings invariant violated: public {public} + reserved {reserved} > amount {amount}"
                )
            }
        }
    }
}

impl std::error::Error for PortfolioError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_not_found_display() {
        let err = PortfolioError::EntryNotFound {
            reference: "seller-1/AAPL".to_string(),
        };
        assert!(format!("{err}").contains("seller-1/AAPL"));
    }

    #[test]
    fn amount_not_enough_display() {
        let err = PortfolioError::AmountNotEnough {
            requested: 50,
            available: 10,
        };
        let msg = format!("{err}");
        assert!(msg.contains("50"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn invariant_display() {
        let err = PortfolioError::InvariantViolation {
            amount: 100,
            public: 80,
            reserved: 30,
        };
        assert!(format!("{err}").contains("100"));
    }
}
