//! OtcOption Aggregate Root
//!
//! The executable contract created when an accepted offer's premium
//! settles. The buyer may exercise until the settlement date; afterwards
//! the expiration sweep retires the contract.

use serde::{Deserialize, Serialize};

use super::errors::OptionError;
use super::value_objects::OptionStatus;
use crate::domain::shared::{
    Money, OfferId, OptionId, SettlementDate, ShareCount, Symbol, Timestamp, UserId,
};

/// Command to grant a new option from an accepted offer.
#[derive(Debug, Clone)]
pub struct GrantOptionCommand {
    /// The owning offer.
    pub offer_id: OfferId,
    /// Option writer (share owner).
    pub seller_id: UserId,
    /// Option holder.
    pub buyer_id: UserId,
    /// Underlying security.
    pub symbol: Symbol,
    /// Per-share price paid on exercise.
    pub strike_price: Money,
    /// Number of shares covered.
    pub amount: ShareCount,
    /// Premium that was paid for the contract.
    pub premium: Money,
    /// Last exercisable date.
    pub settlement_date: SettlementDate,
}

/// OtcOption Aggregate Root.
///
/// Status is monotonic: VALID → USED (exercise settled) or
/// VALID → EXPIRED (sweep). Terminal states never transition again;
/// contracts are retained as history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtcOption {
    id: OptionId,
    offer_id: OfferId,
    seller_id: UserId,
    buyer_id: UserId,
    symbol: Symbol,
    strike_price: Money,
    amount: ShareCount,
    premium: Money,
    settlement_date: SettlementDate,
    status: OptionStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl OtcOption {
    /// Grant a new VALID option.
    #[must_use]
    pub fn grant(cmd: GrantOptionCommand) -> Self {
        let now = Timestamp::now();
        Self {
            id: OptionId::generate(),
            offer_id: cmd.offer_id,
            seller_id: cmd.seller_id,
            buyer_id: cmd.buyer_id,
            symbol: cmd.symbol,
            strike_price: cmd.strike_price,
            amount: cmd.amount,
            premium: cmd.premium,
            settlement_date: cmd.settlement_date,
            status: OptionStatus::Valid,
            created_at: now,
            updated_at: now,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the option ID.
    #[must_use]
    pub const fn id(&self) -> &OptionId {
        &self.id
    }

    /// Get the owning offer.
    #[must_use]
    pub const fn offer_id(&self) -> &OfferId {
        &self.offer_id
    }

    /// Get the option writer.
    #[must_use]
    pub const fn seller_id(&self) -> &UserId {
        &self.seller_id
    }

    /// Get the option holder.
    #[must_use]
    pub const fn buyer_id(&self) -> &UserId {
        &self.buyer_id
    }

    /// Get the underlying security.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the strike price.
    #[must_use]
    pub const fn strike_price(&self) -> Money {
        self.strike_price
    }

    /// Get the covered share amount.
    #[must_use]
    pub const fn amount(&self) -> ShareCount {
        self.amount
    }

    /// Get the premium paid.
    #[must_use]
    pub const fn premium(&self) -> Money {
        self.premium
    }

    /// Get the settlement date.
    #[must_use]
    pub const fn settlement_date(&self) -> SettlementDate {
        self.settlement_date
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OptionStatus {
        self.status
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Total exercise cost: strike price × covered shares.
    #[must_use]
    pub fn exercise_total(&self) -> Money {
        self.strike_price * self.amount.get()
    }

    // ========================================================================
    // Eligibility & State Transitions
    // ========================================================================

    /// Check the option can be exercised by `actor` on `today`.
    ///
    /// All checks run before any money moves, so an ineligible exercise
    /// never reaches the payment gateway.
    ///
    /// # Errors
    ///
    /// - `UnauthorizedAccess` if the actor is not the holder.
    /// - `AlreadyExercised` if the option is USED.
    /// - `SettlementExpired` if the option is EXPIRED or the settlement
    ///   date is in the past.
    pub fn ensure_exercisable(
        &self,
        actor: &UserId,
        today: SettlementDate,
    ) -> Result<(), OptionError> {
        if actor != &self.buyer_id {
            return Err(OptionError::UnauthorizedAccess {
                user_id: actor.to_string(),
            });
        }
        if self.status == OptionStatus::Used {
            return Err(OptionError::AlreadyExercised {
                option_id: self.id.to_string(),
            });
        }
        if self.status == OptionStatus::Expired || self.settlement_date.is_past(today) {
            return Err(OptionError::SettlementExpired {
                option_id: self.id.to_string(),
            });
        }
        Ok(())
    }

    /// Mark the option USED once the exercise payment settled.
    ///
    /// # Errors
    ///
    /// Returns error unless the option is VALID.
    pub fn mark_used(&mut self) -> Result<(), OptionError> {
        self.transition_from_valid(OptionStatus::Used)
    }

    /// Mark the option EXPIRED during the expiration sweep.
    ///
    /// # Errors
    ///
    /// Returns error unless the option is VALID.
    pub fn mark_expired(&mut self) -> Result<(), OptionError> {
        self.transition_from_valid(OptionStatus::Expired)
    }

    fn transition_from_valid(&mut self, to: OptionStatus) -> Result<(), OptionError> {
        if self.status != OptionStatus::Valid {
            return Err(OptionError::InvalidStateTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
