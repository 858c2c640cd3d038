//! Reservation Ledger
//!
//! Pure bookkeeping over `PortfolioEntry` holdings. The three release
//! paths are semantically distinct and deliberately separate methods:
//! compensation returns shares to the public pool, expiry returns them
//! to private holdings, and exercise transfers them to the buyer.

use rust_decimal::Decimal;

use super::entry::PortfolioEntry;
use super::errors::PortfolioError;
use crate::domain::shared::{Money, ShareCount};

/// Stateless bookkeeping service for share reservations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservationLedger;

impl ReservationLedger {
    /// Create a new ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Pledge `qty` public shares to an accepted offer.
    ///
    /// # Errors
    ///
    /// Returns `AmountNotEnough` if fewer than `qty` shares are public.
    pub fn reserve(&self, entry: &mut PortfolioEntry, qty: ShareCount) -> Result<(), PortfolioError> {
        if entry.public_amount() < qty {
            return Err(PortfolioError::AmountNotEnough {
                requested: qty.get(),
                available: entry.public_amount().get(),
            });
        }
        let public = entry.public_amount().checked_sub(qty).map_err(|_| {
            PortfolioError::AmountNotEnough {
                requested: qty.get(),
                available: entry.public_amount().get(),
            }
        })?;
        let reserved = entry.reserved_amount().checked_add(qty).map_err(|_| {
            PortfolioError::InvariantViolation {
                amount: entry.amount().get(),
                public: public.get(),
                reserved: entry.reserved_amount().get(),
            }
        })?;
        entry.set_holdings(entry.amount(), public, reserved)
    }

    /// Return `qty` reserved shares to the public pool.
    ///
    /// Compensation path: a failed premium payment reopens the offer, so
    /// the shares go back on the market.
    ///
    /// # Errors
    ///
    /// Returns `ReservedNotEnough` if fewer than `qty` shares are reserved.
    pub fn release_to_public(
        &self,
        entry: &mut PortfolioEntry,
        qty: ShareCount,
    ) -> Result<(), PortfolioError> {
        let reserved = self.take_reserved(entry, qty)?;
        let public = entry.public_amount().checked_add(qty).map_err(|_| {
            PortfolioError::InvariantViolation {
                amount: entry.amount().get(),
                public: entry.public_amount().get(),
                reserved: reserved.get(),
            }
        })?;
        entry.set_holdings(entry.amount(), public, reserved)
    }

    /// Return `qty` reserved shares to private holdings.
    ///
    /// Expiry path: shares that backed an expired option are not
    /// re-offered automatically; they stay owned and leave the pledge.
    ///
    /// # Errors
    ///
    /// Returns `ReservedNotEnough` if fewer than `qty` shares are reserved.
    pub fn release_to_private(
        &self,
        entry: &mut PortfolioEntry,
        qty: ShareCount,
    ) -> Result<(), PortfolioError> {
        let reserved = self.take_reserved(entry, qty)?;
        entry.set_holdings(entry.amount(), entry.public_amount(), reserved)
    }

    /// Move `qty` reserved shares from seller to buyer at `price`.
    ///
    /// The buyer's weighted-average price is recomputed exactly as a
    /// normal purchase would:
    /// `(old_avg × old_qty + price × qty) / (old_qty + qty)`.
    ///
    /// # Errors
    ///
    /// Returns `ReservedNotEnough` if the seller has fewer than `qty`
    /// shares reserved.
    pub fn transfer_ownership(
        &self,
        seller: &mut PortfolioEntry,
        buyer: &mut PortfolioEntry,
        qty: ShareCount,
        price: Money,
    ) -> Result<(), PortfolioError> {
        let seller_reserved = self.take_reserved(seller, qty)?;
        let seller_amount = seller.amount().checked_sub(qty).map_err(|_| {
            PortfolioError::InvariantViolation {
                amount: seller.amount().get(),
                public: seller.public_amount().get(),
                reserved: seller_reserved.get(),
            }
        })?;

        let old_qty = buyer.amount();
        let new_qty = old_qty.checked_add(qty).map_err(|_| {
            PortfolioError::InvariantViolation {
                amount: old_qty.get(),
                public: buyer.public_amount().get(),
                reserved: buyer.reserved_amount().get(),
            }
        })?;

        let new_avg = if new_qty.is_zero() {
            Money::ZERO
        } else {
            let cost = buyer.average_price() * old_qty.get() + price * qty.get();
            (cost / Decimal::from(new_qty.get())).round()
        };

        seller.set_holdings(seller_amount, seller.public_amount(), seller_reserved)?;
        buyer.set_holdings(new_qty, buyer.public_amount(), buyer.reserved_amount())?;
        buyer.set_average_price(new_avg);
        Ok(())
    }

    fn take_reserved(
        &self,
        entry: &PortfolioEntry,
        qty: ShareCount,
    ) -> Result<ShareCount, PortfolioError> {
        entry.reserved_amount().checked_sub(qty).map_err(|_| {
            PortfolioError::ReservedNotEnough {
                requested: qty.get(),
                reserved: entry.reserved_amount().get(),
            }
        })
    }
}
