//! OtcOffer Aggregate Root
//!
//! A negotiable proposal between a buyer and a seller. Negotiation is
//! turn-based: whoever authored the latest terms must wait for the other
//! side to accept, reject, or counter; only the author may withdraw.

use serde::{Deserialize, Serialize};

use super::errors::NegotiationError;
use super::value_objects::{OfferStatus, OfferTerms};
use crate::domain::shared::{
    Money, OfferId, OptionId, SettlementDate, ShareCount, Symbol, Timestamp, UserId,
};

/// Command to open a new offer.
///
/// The buyer proposes terms against shares the seller has made public.
#[derive(Debug, Clone)]
pub struct OpenOfferCommand {
    /// Underlying security.
    pub symbol: Symbol,
    /// Proposing buyer.
    pub buyer_id: UserId,
    /// Owner of the shares.
    pub seller_id: UserId,
    /// Proposed terms.
    pub terms: OfferTerms,
}

impl OpenOfferCommand {
    /// Validate the command parameters.
    ///
    /// # Errors
    ///
    /// Returns error if the terms are invalid or buyer and seller are
    /// the same user.
    pub fn validate(&self) -> Result<(), NegotiationError> {
        self.symbol.validate()?;
        self.terms.validate()?;
        if self.buyer_id == self.seller_id {
            return Err(NegotiationError::SelfTrade {
                user_id: self.buyer_id.to_string(),
            });
        }
        Ok(())
    }
}

/// OtcOffer Aggregate Root.
///
/// Tracks the negotiation state machine and the turn rule: the party in
/// `last_modified_by` may not be the actor of the next accept/reject/
/// counter, and only that party may cancel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtcOffer {
    id: OfferId,
    symbol: Symbol,
    buyer_id: UserId,
    seller_id: UserId,
    terms: OfferTerms,
    status: OfferStatus,
    last_modified_by: UserId,
    last_modified: Timestamp,
    option_id: Option<OptionId>,
    created_at: Timestamp,
}

impl OtcOffer {
    /// Open a new offer in PENDING status.
    ///
    /// The buyer authors the initial terms, so the seller moves next.
    ///
    /// # Errors
    ///
    /// Returns error if command validation fails.
    pub fn open(cmd: OpenOfferCommand) -> Result<Self, NegotiationError> {
        cmd.validate()?;

        let now = Timestamp::now();
        Ok(Self {
            id: OfferId::generate(),
            symbol: cmd.symbol,
            buyer_id: cmd.buyer_id.clone(),
            seller_id: cmd.seller_id,
            terms: cmd.terms,
            status: OfferStatus::Pending,
            last_modified_by: cmd.buyer_id,
            last_modified: now,
            option_id: None,
            created_at: now,
        })
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the offer ID.
    #[must_use]
    pub const fn id(&self) -> &OfferId {
        &self.id
    }

    /// Get the underlying security.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the buyer.
    #[must_use]
    pub const fn buyer_id(&self) -> &UserId {
        &self.buyer_id
    }

    /// Get the seller.
    #[must_use]
    pub const fn seller_id(&self) -> &UserId {
        &self.seller_id
    }

    /// Get the current terms.
    #[must_use]
    pub const fn terms(&self) -> &OfferTerms {
        &self.terms
    }

    /// Get the share amount.
    #[must_use]
    pub const fn amount(&self) -> ShareCount {
        self.terms.amount
    }

    /// Get the per-share exercise price.
    #[must_use]
    pub const fn price_per_share(&self) -> Money {
        self.terms.price_per_share
    }

    /// Get the premium.
    #[must_use]
    pub const fn premium(&self) -> Money {
        self.terms.premium
    }

    /// Get the settlement date.
    #[must_use]
    pub const fn settlement_date(&self) -> SettlementDate {
        self.terms.settlement_date
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OfferStatus {
        self.status
    }

    /// Get the author of the latest state change.
    #[must_use]
    pub const fn last_modified_by(&self) -> &UserId {
        &self.last_modified_by
    }

    /// Get the last modification time.
    #[must_use]
    pub const fn last_modified(&self) -> Timestamp {
        self.last_modified
    }

    /// Get the linked option, once the premium settled.
    #[must_use]
    pub const fn option_id(&self) -> Option<&OptionId> {
        self.option_id.as_ref()
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Whether the user is the buyer or the seller.
    #[must_use]
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        &self.buyer_id == user_id || &self.seller_id == user_id
    }

    /// The other party, if the user is a participant.
    #[must_use]
    pub fn counterparty_of(&self, user_id: &UserId) -> Option<&UserId> {
        if user_id == &self.buyer_id {
            Some(&self.seller_id)
        } else if user_id == &self.seller_id {
            Some(&self.buyer_id)
        } else {
            None
        }
    }

    /// Whether the user may make the next negotiation move.
    #[must_use]
    pub fn can_interact(&self, user_id: &UserId) -> bool {
        self.status.is_pending()
            && self.is_participant(user_id)
            && &self.last_modified_by != user_id
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Rewrite the terms as a counter-offer.
    ///
    /// Only the counterparty to the latest change may counter; the offer
    /// returns to PENDING with the actor as the new author.
    ///
    /// # Errors
    ///
    /// Returns error if the offer is not PENDING, the actor is not the
    /// counterparty, or the terms are invalid.
    pub fn counter(&mut self, actor: &UserId, terms: OfferTerms) -> Result<(), NegotiationError> {
        self.ensure_pending("counter")?;
        self.ensure_counterparty_turn(actor, "counter")?;
        terms.validate()?;

        self.terms = terms;
        self.status = OfferStatus::Pending;
        self.touch(actor);
        Ok(())
    }

    /// Accept the current terms.
    ///
    /// Share reservation and the premium saga are the caller's
    /// responsibility; this transition only records the agreement.
    ///
    /// # Errors
    ///
    /// Returns error if the offer is not PENDING or the turn rule is
    /// violated (self-acceptance).
    pub fn accept(&mut self, actor: &UserId) -> Result<(), NegotiationError> {
        self.ensure_pending("accept")?;
        self.ensure_counterparty_turn(actor, "accept")?;

        self.status = OfferStatus::Accepted;
        self.touch(actor);
        Ok(())
    }

    /// Reject the current terms. Terminal.
    ///
    /// # Errors
    ///
    /// Returns error if the offer is not PENDING or the turn rule is
    /// violated.
    pub fn reject(&mut self, actor: &UserId) -> Result<(), NegotiationError> {
        self.ensure_pending("reject")?;
        self.ensure_counterparty_turn(actor, "reject")?;

        self.status = OfferStatus::Rejected;
        self.touch(actor);
        Ok(())
    }

    /// Withdraw the offer. Terminal.
    ///
    /// Only the author of the latest change may cancel their own terms.
    ///
    /// # Errors
    ///
    /// Returns error if the offer is not PENDING or the actor is not the
    /// author of the latest change.
    pub fn cancel(&mut self, actor: &UserId) -> Result<(), NegotiationError> {
        self.ensure_pending("cancel")?;
        if !self.is_participant(actor) || &self.last_modified_by != actor {
            return Err(NegotiationError::UnauthorizedAction {
                user_id: actor.to_string(),
                action: "cancel".to_string(),
            });
        }

        self.status = OfferStatus::Cancelled;
        self.touch(actor);
        Ok(())
    }

    /// Revert an accepted offer to PENDING after a failed premium payment.
    ///
    /// The reservation compensation happens in the ledger; this reopens
    /// negotiation. The author of the acceptance keeps the turn marker so
    /// the other side moves next.
    ///
    /// # Errors
    ///
    /// Returns error if the offer is not ACCEPTED.
    pub fn revert_to_pending(&mut self) -> Result<(), NegotiationError> {
        if self.status != OfferStatus::Accepted {
            return Err(NegotiationError::InvalidState {
                status: self.status,
                action: "revert to pending".to_string(),
            });
        }

        self.status = OfferStatus::Pending;
        self.last_modified = Timestamp::now();
        Ok(())
    }

    /// Link the option created when the premium settled.
    ///
    /// # Errors
    ///
    /// Returns error if the offer is not ACCEPTED or already linked.
    pub fn attach_option(&mut self, option_id: OptionId) -> Result<(), NegotiationError> {
        if self.status != OfferStatus::Accepted || self.option_id.is_some() {
            return Err(NegotiationError::InvalidState {
                status: self.status,
                action: "attach option".to_string(),
            });
        }

        self.option_id = Some(option_id);
        self.last_modified = Timestamp::now();
        Ok(())
    }

    /// Mark the offer EXERCISED once its option's exercise settled. Terminal.
    ///
    /// # Errors
    ///
    /// Returns error unless the offer is ACCEPTED with a linked option.
    pub fn mark_exercised(&mut self) -> Result<(), NegotiationError> {
        if self.status != OfferStatus::Accepted || self.option_id.is_none() {
            return Err(NegotiationError::InvalidState {
                status: self.status,
                action: "mark exercised".to_string(),
            });
        }

        self.status = OfferStatus::Exercised;
        self.last_modified = Timestamp::now();
        Ok(())
    }

    // ========================================================================
    // Private Helpers
    // ========================================================================

    fn ensure_pending(&self, action: &str) -> Result<(), NegotiationError> {
        if self.status.is_pending() {
            Ok(())
        } else {
            Err(NegotiationError::InvalidState {
                status: self.status,
                action: action.to_string(),
            })
        }
    }

    fn ensure_counterparty_turn(
        &self,
        actor: &UserId,
        action: &str,
    ) -> Result<(), NegotiationError> {
        if !self.is_participant(actor) || &self.last_modified_by == actor {
            return Err(NegotiationError::UnauthorizedAction {
                user_id: actor.to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    fn touch(&mut self, actor: &UserId) {
        self.last_modified_by = actor.clone();
        self.last_modified = Timestamp::now();
    }
}
