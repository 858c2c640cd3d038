//! Negotiation errors.

use std::fmt;

use super::value_objects::OfferStatus;
use crate::domain::shared::DomainError;

/// Errors that can occur while negotiating an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// Offer not found.
    OfferNotFound {
        /// Offer ID.
        offer_id: String,
    },

    /// The acting user may not perform this move.
    ///
    /// Raised when the actor is not a counterparty, or when the
    /// turn-based rule is violated (the author of the latest change may
    /// only cancel, the other side may only accept/reject/counter).
    UnauthorizedAction {
        /// Acting user.
        user_id: String,
        /// Attempted move.
        action: String,
    },

    /// The offer is not in a state that allows this move.
    InvalidState {
        /// Current status.
        status: OfferStatus,
        /// Attempted move.
        action: String,
    },

    /// Invalid offer terms.
    InvalidTerms {
        /// Underlying validation error.
        source: DomainError,
    },

    /// Buyer and seller must be distinct users.
    SelfTrade {
        /// The user on both sides.
        user_id: String,
    },
}

impl fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OfferNotFound { offer_id } => {
                write!(f, "Offer not found: {offer_id}")
            }
            Self::UnauthorizedAction { user_id, action } => {
                write!(f, "User {user_id} may not {action} this offer")
            }
            Self::InvalidState { status, action } => {
                write!(f, "Cannot {action} an offer in status {status}")
            }
            Self::InvalidTerms { source } => {
                write!(f, "Invalid offer terms: {source}")
            }
            Self::SelfTrade { user_id } => {
                write!(f, "User {user_id} cannot trade with themselves")
            }
        }
    }
}

impl std::error::Error for NegotiationError {}

impl From<DomainError> for NegotiationError {
    fn from(source: DomainError) -> Self {
        Self::InvalidTerms { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_not_found_display() {
        let err = NegotiationError::OfferNotFound {
            offer_id: "offer-1".to_string(),
        };
        assert!(format!("{err}").contains("offer-1"));
    }

    #[test]
    fn unauthorized_display() {
        let err = NegotiationError::UnauthorizedAction {
            user_id: "user-1".to_string(),
            action: "accept".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("user-1"));
        assert!(msg.contains("accept"));
    }

    #[test]
    fn invalid_state_display() {
        let err = NegotiationError::InvalidState {
            status: OfferStatus::Rejected,
            action: "counter".to_string(),
        };
        assert!(format!("{err}").contains("REJECTED"));
    }

    #[test]
    fn negotiation_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(NegotiationError::SelfTrade {
            user_id: "u".to_string(),
        });
        assert!(!err.to_string().is_empty());
    }
}
