//! PortfolioEntry Aggregate Root
//!
//! One row per (user, security). `amount` is the total owned;
//! `public_amount` is the subset offered for OTC trading and
//! `reserved_amount` the subset pledged to a pending option. The
//! remainder (`amount - public - reserved`) is private holdings.

use serde::{Deserialize, Serialize};

use super::errors::PortfolioError;
use crate::domain::shared::{EntryId, Money, ShareCount, Symbol, Timestamp, UserId};

/// A user's holding in one security.
///
/// Invariant: `public_amount + reserved_amount ≤ amount`. Reserved
/// quantities change only through the `ReservationLedger`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEntry {
    id: EntryId,
    user_id: UserId,
    symbol: Symbol,
    amount: ShareCount,
    public_amount: ShareCount,
    reserved_amount: ShareCount,
    average_price: Money,
    updated_at: Timestamp,
}

impl PortfolioEntry {
    /// Create a new entry, typically on first trade execution.
    #[must_use]
    pub fn new(user_id: UserId, symbol: Symbol, amount: ShareCount, average_price: Money) -> Self {
        Self {
            id: EntryId::generate(),
            user_id,
            symbol,
            amount,
            public_amount: ShareCount::ZERO,
            reserved_amount: ShareCount::ZERO,
            average_price,
            updated_at: Timestamp::now(),
        }
    }

    /// Create an empty entry for a user who holds none of the security yet.
    ///
    /// Used by the find-or-create path of ownership transfer.
    #[must_use]
    pub fn empty(user_id: UserId, symbol: Symbol) -> Self {
        Self::new(user_id, symbol, ShareCount::ZERO, Money::ZERO)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the entry ID.
    #[must_use]
    pub const fn id(&self) -> &EntryId {
        &self.id
    }

    /// Get the owner.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get the security.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Total owned shares.
    #[must_use]
    pub const fn amount(&self) -> ShareCount {
        self.amount
    }

    /// Shares offered for OTC trading.
    #[must_use]
    pub const fn public_amount(&self) -> ShareCount {
        self.public_amount
    }

    /// Shares pledged to a pending offer or option.
    #[must_use]
    pub const fn reserved_amount(&self) -> ShareCount {
        self.reserved_amount
    }

    /// Weighted-average acquisition price.
    #[must_use]
    pub const fn average_price(&self) -> Money {
        self.average_price
    }

    /// Last update time.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Verify the holdings invariant.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        self.public_amount
            .get()
            .checked_add(self.reserved_amount.get())
            .is_some_and(|held| held <= self.amount.get())
    }

    // ========================================================================
    // Mutations (ledger and owner intents)
    // ========================================================================

    /// Offer part of the private holding for OTC trading.
    ///
    /// # Errors
    ///
    /// Returns error if the quantity would break the holdings invariant.
    pub fn make_public(&mut self, qty: ShareCount) -> Result<(), PortfolioError> {
        let new_public = self.public_amount.get().checked_add(qty.get());
        let held = new_public.and_then(|public| public.checked_add(self.reserved_amount.get()));
        match (new_public, held) {
            (Some(public), Some(held)) if held <= self.amount.get() => {
                self.public_amount = ShareCount::new(public);
                self.touch();
                Ok(())
            }
            _ => Err(PortfolioError::InvariantViolation {
                amount: self.amount.get(),
                public: self.public_amount.get().saturating_add(qty.get()),
                reserved: self.reserved_amount.get(),
            }),
        }
    }

    pub(super) fn set_holdings(
        &mut self,
        amount: ShareCount,
        public_amount: ShareCount,
        reserved_amount: ShareCount,
    ) -> Result<(), PortfolioError> {
        let held = public_amount.get().checked_add(reserved_amount.get());
        if !held.is_some_and(|held| held <= amount.get()) {
            return Err(PortfolioError::InvariantViolation {
                amount: amount.get(),
                public: public_amount.get(),
                reserved: reserved_amount.get(),
            });
        }
        self.amount = amount;
        self.public_amount = public_amount;
        self.reserved_amount = reserved_amount;
        self.touch();
        Ok(())
    }

    pub(super) fn set_average_price(&mut self, price: Money) {
        self.average_price = price;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
