//! Banking Port (Driven Port)
//!
//! Interface to the external payment gateway. Payment acceptance is
//! synchronous; settlement is confirmed later through the saga
//! coordinator's callback entry point.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::shared::{GatewayRef, Money, UserId};

/// Settlement account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    /// Account of a natural person.
    Personal,
    /// Account of a legal entity.
    Company,
}

/// A party's settlement account at the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementAccount {
    /// Account owner.
    pub owner_id: UserId,
    /// Bank account number.
    pub account_number: String,
    /// Account classification.
    pub kind: AccountKind,
}

/// A payment order submitted to the gateway.
///
/// The tracked payment's ID travels in `reference` so the asynchronous
/// callback can be correlated with its saga record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInstruction {
    /// Paying account.
    pub sender: SettlementAccount,
    /// Receiving account.
    pub receiver: SettlementAccount,
    /// Amount to transfer.
    pub amount: Money,
    /// Bank payment code.
    pub code: String,
    /// Human-readable purpose line.
    pub purpose: String,
    /// Correlation reference (tracked payment ID).
    pub reference: String,
    /// The platform user on whose behalf the payment runs.
    pub client_id: UserId,
}

/// Errors from the banking gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BankingError {
    /// The gateway refused the payment synchronously.
    #[error("Payment refused by gateway: {reason}")]
    PaymentRefused {
        /// Gateway-supplied reason.
        reason: String,
    },

    /// A rollback request was refused.
    #[error("Rejection of payment {reference} refused: {reason}")]
    RejectionRefused {
        /// The gateway reference being rejected.
        reference: String,
        /// Gateway-supplied reason.
        reason: String,
    },

    /// The gateway could not be reached.
    #[error("Banking gateway unavailable: {message}")]
    Unavailable {
        /// Transport-level detail.
        message: String,
    },
}

/// Port for the external payment gateway.
#[async_trait]
pub trait BankingPort: Send + Sync {
    /// Look up a user's settlement account.
    ///
    /// Returns `None` if the user has no account; the caller decides
    /// whether that is an error.
    ///
    /// # Errors
    ///
    /// Returns error if the gateway cannot be reached.
    async fn settlement_account(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SettlementAccount>, BankingError>;

    /// Submit a payment for asynchronous settlement.
    ///
    /// Returns the gateway's own reference on synchronous acceptance.
    /// The settlement outcome arrives later as a callback.
    ///
    /// # Errors
    ///
    /// Returns error if the gateway refuses the payment or is unreachable.
    async fn execute_system_payment(
        &self,
        instruction: PaymentInstruction,
    ) -> Result<GatewayRef, BankingError>;

    /// Ask the gateway to reverse an accepted payment.
    ///
    /// Best-effort compensation. A failure here must be escalated by the
    /// caller, never swallowed.
    ///
    /// # Errors
    ///
    /// Returns error if the gateway refuses the rejection or is
    /// unreachable.
    async fn reject_payment(&self, reference: &GatewayRef) -> Result<(), BankingError>;
}
