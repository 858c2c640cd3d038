//! Offer repository trait.

use async_trait::async_trait;

use super::aggregate::OtcOffer;
use super::errors::NegotiationError;
use crate::domain::shared::{OfferId, UserId};

/// Repository for `OtcOffer` aggregates.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Persist an offer (insert or update).
    async fn save(&self, offer: &OtcOffer) -> Result<(), NegotiationError>;

    /// Find an offer by ID.
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<OtcOffer>, NegotiationError>;

    /// All PENDING offers where the user is buyer or seller.
    async fn find_pending_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<OtcOffer>, NegotiationError>;
}
