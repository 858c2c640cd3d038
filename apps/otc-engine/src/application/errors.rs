//! Application error handling.
//!
//! Wraps domain and port errors into one type with a coarse
//! classification, so thin transport layers can map outcomes to their
//! own status codes without inspecting every variant.
//!
//! | Kind | Meaning |
//! |------|---------|
//! | `NotFound` | Offer, option, payment, or portfolio entry absent |
//! | `Unauthorized` | Wrong actor or wrong negotiation turn |
//! | `Conflict` | State machine or holdings rule violated |
//! | `ExecutionFailed` | External dependency refused before settlement |
//! | `Unrecoverable` | Money moved but domain state is inconsistent |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::BankingError;
use crate::domain::negotiation::NegotiationError;
use crate::domain::option_contract::OptionError;
use crate::domain::payment_saga::SagaError;
use crate::domain::portfolio::PortfolioError;

/// Coarse error classification for transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The referenced entity does not exist. Non-retriable without new input.
    NotFound,
    /// Wrong actor or wrong turn. Non-retriable.
    Unauthorized,
    /// A state machine or holdings rule was violated. Non-retriable.
    Conflict,
    /// An external dependency refused the action. The domain is unchanged.
    ExecutionFailed,
    /// Money may have moved while domain state did not. Requires operator
    /// attention; never retried silently.
    Unrecoverable,
}

/// Top-level error for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Offer negotiation rule violated.
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    /// Option lifecycle rule violated.
    #[error(transparent)]
    Option(#[from] OptionError),

    /// Portfolio bookkeeping rule violated.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    /// Payment saga rule violated.
    #[error(transparent)]
    Saga(#[from] SagaError),

    /// The banking gateway refused or failed a call.
    #[error("Banking gateway error: {0}")]
    Banking(#[from] BankingError),

    /// A party has no settlement account at the bank.
    #[error("No settlement account found for user {user_id}")]
    AccountNotFound {
        /// The user without an account.
        user_id: String,
    },

    /// A compensating rollback failed after a settled payment.
    ///
    /// The gateway holds money for an action the domain could not
    /// complete. Escalated, never swallowed.
    #[error("Rollback of payment {payment_id} failed after '{stage}': {reason}")]
    RollbackFailed {
        /// The tracked payment whose rollback failed.
        payment_id: String,
        /// The completion stage that triggered the rollback.
        stage: String,
        /// Why the rollback failed.
        reason: String,
    },
}

impl EngineError {
    /// Classify the error for transport mapping.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Negotiation(e) => match e {
                NegotiationError::OfferNotFound { .. } => ErrorKind::NotFound,
                NegotiationError::UnauthorizedAction { .. } | NegotiationError::SelfTrade { .. } => {
                    ErrorKind::Unauthorized
                }
                NegotiationError::InvalidState { .. } | NegotiationError::InvalidTerms { .. } => {
                    ErrorKind::Conflict
                }
            },
            Self::Option(e) => match e {
                OptionError::NotFound { .. } => ErrorKind::NotFound,
                OptionError::UnauthorizedAccess { .. } => ErrorKind::Unauthorized,
                OptionError::AlreadyExercised { .. }
                | OptionError::SettlementExpired { .. }
                | OptionError::InvalidStateTransition { .. } => ErrorKind::Conflict,
            },
            Self::Portfolio(e) => match e {
                PortfolioError::EntryNotFound { .. } => ErrorKind::NotFound,
                PortfolioError::InvalidPublicAmount { .. }
                | PortfolioError::AmountNotEnough { .. }
                | PortfolioError::ReservedNotEnough { .. }
                | PortfolioError::InvariantViolation { .. } => ErrorKind::Conflict,
            },
            Self::Saga(e) => match e {
                SagaError::PaymentNotFound { .. } => ErrorKind::NotFound,
                SagaError::AlreadyCompleted { .. } => ErrorKind::Conflict,
                // A purpose with no handler is a wiring defect, not a
                // client error.
                SagaError::NoHandlerRegistered { .. } => ErrorKind::Unrecoverable,
            },
            Self::Banking(_) | Self::AccountNotFound { .. } => ErrorKind::ExecutionFailed,
            Self::RollbackFailed { .. } => ErrorKind::Unrecoverable,
        }
    }
}
