//! In-memory repositories for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::negotiation::aggregate::OtcOffer;
use crate::domain::negotiation::errors::NegotiationError;
use crate::domain::negotiation::repository::OfferRepository;
use crate::domain::option_contract::aggregate::OtcOption;
use crate::domain::option_contract::errors::OptionError;
use crate::domain::option_contract::repository::OptionRepository;
use crate::domain::option_contract::value_objects::{OptionFilter, OptionStatus};
use crate::domain::payment_saga::{SagaError, TrackedPayment, TrackedPaymentRepository};
use crate::domain::portfolio::entry::PortfolioEntry;
use crate::domain::portfolio::errors::PortfolioError;
use crate::domain::portfolio::repository::PortfolioRepository;
use crate::domain::shared::{EntryId, OfferId, OptionId, PaymentId, SettlementDate, Symbol, UserId};

// =============================================================================
// Offers
// =============================================================================

/// In-memory implementation of `OfferRepository`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct InMemoryOfferRepository {
    offers: RwLock<HashMap<String, OtcOffer>>,
}

impl InMemoryOfferRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored offers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.read().unwrap().len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.read().unwrap().is_empty()
    }
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn save(&self, offer: &OtcOffer) -> Result<(), NegotiationError> {
        let mut offers = self.offers.write().unwrap();
        offers.insert(offer.id().as_str().to_string(), offer.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OfferId) -> Result<Option<OtcOffer>, NegotiationError> {
        let offers = self.offers.read().unwrap();
        Ok(offers.get(id.as_str()).cloned())
    }

    async fn find_pending_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<OtcOffer>, NegotiationError> {
        let offers = self.offers.read().unwrap();
        Ok(offers
            .values()
            .filter(|o| o.status().is_pending() && o.is_participant(user_id))
            .cloned()
            .collect())
    }
}

// =============================================================================
// Options
// =============================================================================

/// In-memory implementation of `OptionRepository`.
#[derive(Debug, Default)]
pub struct InMemoryOptionRepository {
    options: RwLock<HashMap<String, OtcOption>>,
}

impl InMemoryOptionRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.read().unwrap().len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.read().unwrap().is_empty()
    }
}

#[async_trait]
impl OptionRepository for InMemoryOptionRepository {
    async fn save(&self, option: &OtcOption) -> Result<(), OptionError> {
        let mut options = self.options.write().unwrap();
        options.insert(option.id().as_str().to_string(), option.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OptionId) -> Result<Option<OtcOption>, OptionError> {
        let options = self.options.read().unwrap();
        Ok(options.get(id.as_str()).cloned())
    }

    async fn find_valid_expired_before(
        &self,
        today: SettlementDate,
    ) -> Result<Vec<OtcOption>, OptionError> {
        let options = self.options.read().unwrap();
        Ok(options
            .values()
            .filter(|o| o.status() == OptionStatus::Valid && o.settlement_date().is_past(today))
            .cloned()
            .collect())
    }

    async fn find_for_user(
        &self,
        user_id: &UserId,
        filter: OptionFilter,
    ) -> Result<Vec<OtcOption>, OptionError> {
        let options = self.options.read().unwrap();
        Ok(options
            .values()
            .filter(|o| {
                (o.buyer_id() == user_id || o.seller_id() == user_id)
                    && filter.matches(o.status())
            })
            .cloned()
            .collect())
    }
}

// =============================================================================
// Portfolio entries
// =============================================================================

/// In-memory implementation of `PortfolioRepository`.
#[derive(Debug, Default)]
pub struct InMemoryPortfolioRepository {
    entries: RwLock<HashMap<String, PortfolioEntry>>,
}

impl InMemoryPortfolioRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[async_trait]
impl PortfolioRepository for InMemoryPortfolioRepository {
    async fn save(&self, entry: &PortfolioEntry) -> Result<(), PortfolioError> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(entry.id().as_str().to_string(), entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EntryId) -> Result<Option<PortfolioEntry>, PortfolioError> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(id.as_str()).cloned())
    }

    async fn find_by_user_and_symbol(
        &self,
        user_id: &UserId,
        symbol: &Symbol,
    ) -> Result<Option<PortfolioEntry>, PortfolioError> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .values()
            .find(|e| e.user_id() == user_id && e.symbol() == symbol)
            .cloned())
    }
}

// =============================================================================
// Tracked payments
// =============================================================================

/// In-memory implementation of `TrackedPaymentRepository`.
#[derive(Debug, Default)]
pub struct InMemoryTrackedPaymentRepository {
    payments: RwLock<HashMap<String, TrackedPayment>>,
}

impl InMemoryTrackedPaymentRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payments.read().unwrap().len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payments.read().unwrap().is_empty()
    }
}

#[async_trait]
impl TrackedPaymentRepository for InMemoryTrackedPaymentRepository {
    async fn save(&self, payment: &TrackedPayment) -> Result<(), SagaError> {
        let mut payments = self.payments.write().unwrap();
        payments.insert(payment.id().as_str().to_string(), payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<TrackedPayment>, SagaError> {
        let payments = self.payments.read().unwrap();
        Ok(payments.get(id.as_str()).cloned())
    }
}
