//! Offer Negotiation Service
//!
//! Orchestrates the `OtcOffer` state machine: opening, countering,
//! accepting, rejecting, cancelling, and the premium payment saga that
//! acceptance starts. All validation and authorization runs before any
//! money moves; the gateway is only called once domain state is staged.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::errors::EngineError;
use crate::application::ports::{BankingPort, IdentityPort, PaymentInstruction, SettlementAccount};
use crate::application::services::locks::EntityLocks;
use crate::application::services::saga_coordinator::{
    PaymentSagaCoordinator, SagaCompletionHandler,
};
use crate::domain::negotiation::aggregate::{OpenOfferCommand, OtcOffer};
use crate::domain::negotiation::errors::NegotiationError;
use crate::domain::negotiation::repository::OfferRepository;
use crate::domain::negotiation::value_objects::OfferTerms;
use crate::domain::option_contract::aggregate::{GrantOptionCommand, OtcOption};
use crate::domain::option_contract::repository::OptionRepository;
use crate::domain::payment_saga::{PaymentPurpose, TrackedPayment, TrackedPaymentRepository};
use crate::domain::portfolio::repository::PortfolioRepository;
use crate::domain::portfolio::{PortfolioError, ReservationLedger};
use crate::domain::shared::{EntryId, OfferId, Symbol, UserId};

/// Bank payment code for option premiums.
const PREMIUM_PAYMENT_CODE: &str = "289";

/// Display name used when neither identity lookup resolves.
const UNKNOWN_USER: &str = "Unknown User";

/// A pending offer annotated for listing.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveOfferView {
    /// The offer itself.
    pub offer: OtcOffer,
    /// Resolved counterparty display name.
    pub counterparty_name: String,
    /// Whether the listed user may make the next move.
    pub can_interact: bool,
}

/// Use-case service for offer negotiation.
pub struct OfferNegotiationService<O, Q, P, T, B, I>
where
    O: OfferRepository,
    Q: OptionRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
    I: IdentityPort,
{
    offers: Arc<O>,
    options: Arc<Q>,
    portfolios: Arc<P>,
    ledger: ReservationLedger,
    saga: Arc<PaymentSagaCoordinator<T>>,
    banking: Arc<B>,
    identity: Arc<I>,
    locks: Arc<EntityLocks>,
}

impl<O, Q, P, T, B, I> OfferNegotiationService<O, Q, P, T, B, I>
where
    O: OfferRepository,
    Q: OptionRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
    I: IdentityPort,
{
    /// Create a new negotiation service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        offers: Arc<O>,
        options: Arc<Q>,
        portfolios: Arc<P>,
        ledger: ReservationLedger,
        saga: Arc<PaymentSagaCoordinator<T>>,
        banking: Arc<B>,
        identity: Arc<I>,
        locks: Arc<EntityLocks>,
    ) -> Self {
        Self {
            offers,
            options,
            portfolios,
            ledger,
            saga,
            banking,
            identity,
            locks,
        }
    }

    /// Open a new offer against a seller's public shares.
    ///
    /// Nothing is reserved yet; reservation happens on acceptance.
    ///
    /// # Errors
    ///
    /// Returns error if the portfolio entry is missing, the requested
    /// amount exceeds the public quantity, or the terms are invalid.
    pub async fn create_offer(
        &self,
        portfolio_entry_id: &EntryId,
        buyer_id: UserId,
        terms: OfferTerms,
    ) -> Result<OtcOffer, EngineError> {
        let entry = self
            .portfolios
            .find_by_id(portfolio_entry_id)
            .await?
            .ok_or_else(|| {
                EngineError::Portfolio(PortfolioError::EntryNotFound {
                    reference: portfolio_entry_id.to_string(),
                })
            })?;

        if terms.amount > entry.public_amount() {
            return Err(EngineError::Portfolio(PortfolioError::InvalidPublicAmount {
                requested: terms.amount.get(),
                public: entry.public_amount().get(),
            }));
        }

        let offer = OtcOffer::open(OpenOfferCommand {
            symbol: entry.symbol().clone(),
            buyer_id,
            seller_id: entry.user_id().clone(),
            terms,
        })?;
        self.offers.save(&offer).await?;

        tracing::info!(
            offer_id = %offer.id(),
            symbol = %offer.symbol(),
            buyer_id = %offer.buyer_id(),
            seller_id = %offer.seller_id(),
            "offer opened"
        );
        Ok(offer)
    }

    /// Counter an offer with new terms.
    ///
    /// # Errors
    ///
    /// Returns error if the offer is missing, not PENDING, the actor is
    /// not the counterparty, or the terms are invalid.
    pub async fn update_offer(
        &self,
        offer_id: &OfferId,
        actor: &UserId,
        terms: OfferTerms,
    ) -> Result<OtcOffer, EngineError> {
        let _guard = self.locks.acquire(offer_key(offer_id)).await;

        let mut offer = self.load_offer(offer_id).await?;
        offer.counter(actor, terms)?;
        self.offers.save(&offer).await?;

        tracing::info!(offer_id = %offer_id, actor = %actor, "offer countered");
        Ok(offer)
    }

    /// Accept an offer: reserve shares and start the premium saga.
    ///
    /// The option is not created here; the saga's success handler grants
    /// it once the premium settles. A synchronous gateway refusal is
    /// compensated inline and surfaced as an execution failure.
    ///
    /// # Errors
    ///
    /// Returns error on a turn violation, missing portfolio entry,
    /// insufficient public shares, missing settlement account, or a
    /// refused payment.
    pub async fn accept_offer(
        &self,
        offer_id: &OfferId,
        actor: &UserId,
    ) -> Result<OtcOffer, EngineError> {
        let _offer_guard = self.locks.acquire(offer_key(offer_id)).await;

        let mut offer = self.load_offer(offer_id).await?;
        offer.accept(actor)?;

        let _entry_guard = self
            .locks
            .acquire(portfolio_key(offer.seller_id(), offer.symbol()))
            .await;

        let mut entry = self
            .portfolios
            .find_by_user_and_symbol(offer.seller_id(), offer.symbol())
            .await?
            .ok_or_else(|| {
                EngineError::Portfolio(PortfolioError::EntryNotFound {
                    reference: format!("{}/{}", offer.seller_id(), offer.symbol()),
                })
            })?;

        if entry.public_amount() < offer.amount() {
            return Err(EngineError::Portfolio(PortfolioError::AmountNotEnough {
                requested: offer.amount().get(),
                available: entry.public_amount().get(),
            }));
        }

        // Fail fast: both settlement accounts must exist before any
        // domain state changes or money moves. The seller is resolved
        // first so a missing seller account is the diagnosis even when
        // both are absent.
        let seller_account = self.settlement_account(offer.seller_id()).await?;
        let buyer_account = self.settlement_account(offer.buyer_id()).await?;

        self.ledger.reserve(&mut entry, offer.amount())?;
        self.portfolios.save(&entry).await?;
        self.offers.save(&offer).await?;

        let mut payment = self
            .saga
            .begin(TrackedPayment::new(
                PaymentPurpose::OtcCreateOption,
                offer.id().as_str(),
            ))
            .await?;

        let instruction = premium_instruction(&offer, buyer_account, seller_account, &payment);
        match self.banking.execute_system_payment(instruction).await {
            Ok(gateway_ref) => {
                payment.attach_gateway_ref(gateway_ref);
                self.saga.record_dispatch(&payment).await?;
                tracing::info!(
                    offer_id = %offer_id,
                    payment_id = %payment.id(),
                    premium = %offer.premium(),
                    "offer accepted, premium payment dispatched"
                );
                Ok(offer)
            }
            Err(e) => {
                tracing::warn!(
                    offer_id = %offer_id,
                    error = %e,
                    "premium payment refused, compensating acceptance"
                );
                self.ledger.release_to_public(&mut entry, offer.amount())?;
                self.portfolios.save(&entry).await?;
                offer.revert_to_pending()?;
                self.offers.save(&offer).await?;
                self.saga.abort(payment.id()).await?;
                Err(EngineError::Banking(e))
            }
        }
    }

    /// Reject an offer. Terminal, no reservation side effects.
    ///
    /// # Errors
    ///
    /// Returns error if the offer is missing, not PENDING, or the turn
    /// rule is violated.
    pub async fn reject_offer(
        &self,
        offer_id: &OfferId,
        actor: &UserId,
    ) -> Result<OtcOffer, EngineError> {
        let _guard = self.locks.acquire(offer_key(offer_id)).await;

        let mut offer = self.load_offer(offer_id).await?;
        offer.reject(actor)?;
        self.offers.save(&offer).await?;

        tracing::info!(offer_id = %offer_id, actor = %actor, "offer rejected");
        Ok(offer)
    }

    /// Withdraw an offer. Terminal, author-only.
    ///
    /// # Errors
    ///
    /// Returns error if the offer is missing, not PENDING, or the actor
    /// is not the author of the latest change.
    pub async fn cancel_offer(
        &self,
        offer_id: &OfferId,
        actor: &UserId,
    ) -> Result<OtcOffer, EngineError> {
        let _guard = self.locks.acquire(offer_key(offer_id)).await;

        let mut offer = self.load_offer(offer_id).await?;
        offer.cancel(actor)?;
        self.offers.save(&offer).await?;

        tracing::info!(offer_id = %offer_id, actor = %actor, "offer cancelled");
        Ok(offer)
    }

    /// All PENDING offers involving the user, newest activity first.
    ///
    /// Counterparty names resolve best-effort; an unresolvable party is
    /// listed as "Unknown User" rather than failing the request.
    ///
    /// # Errors
    ///
    /// Returns error if the repository fails.
    pub async fn list_active_offers_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ActiveOfferView>, EngineError> {
        let mut offers = self.offers.find_pending_for_user(user_id).await?;
        offers.sort_by(|a, b| b.last_modified().cmp(&a.last_modified()));

        let mut views = Vec::with_capacity(offers.len());
        for offer in offers {
            let counterparty_name = match offer.counterparty_of(user_id) {
                Some(counterparty) => self.resolve_display_name(counterparty).await,
                None => UNKNOWN_USER.to_string(),
            };
            let can_interact = offer.can_interact(user_id);
            views.push(ActiveOfferView {
                offer,
                counterparty_name,
                can_interact,
            });
        }
        Ok(views)
    }

    // ========================================================================
    // Premium saga completion
    // ========================================================================

    /// The premium settled: grant the option and link it to the offer.
    ///
    /// The offer stays ACCEPTED; EXERCISED comes only from a settled
    /// exercise payment. If the grant cannot be recorded after the money
    /// moved, the premium is rolled back at the gateway; a rollback
    /// failure is escalated as unrecoverable.
    ///
    /// # Errors
    ///
    /// Returns the original failure once rolled back, or
    /// `RollbackFailed` when the gateway rejects the rollback too.
    pub async fn handle_premium_success(
        &self,
        payment: &TrackedPayment,
    ) -> Result<(), EngineError> {
        let offer_id = OfferId::new(payment.tracked_entity_id());
        let _guard = self.locks.acquire(offer_key(&offer_id)).await;

        match self.grant_option(&offer_id).await {
            Ok(()) => Ok(()),
            Err(e) => self.rollback_settled_premium(payment, e).await,
        }
    }

    async fn grant_option(&self, offer_id: &OfferId) -> Result<(), EngineError> {
        let mut offer = self.load_offer(offer_id).await?;
        let option = OtcOption::grant(GrantOptionCommand {
            offer_id: offer.id().clone(),
            seller_id: offer.seller_id().clone(),
            buyer_id: offer.buyer_id().clone(),
            symbol: offer.symbol().clone(),
            strike_price: offer.price_per_share(),
            amount: offer.amount(),
            premium: offer.premium(),
            settlement_date: offer.settlement_date(),
        });

        offer.attach_option(option.id().clone())?;
        self.options.save(&option).await?;
        self.offers.save(&offer).await?;

        tracing::info!(
            offer_id = %offer_id,
            option_id = %option.id(),
            "premium settled, option granted"
        );
        Ok(())
    }

    /// Money settled but the option could not be granted: reject the
    /// premium at the gateway and surface the original failure.
    async fn rollback_settled_premium(
        &self,
        payment: &TrackedPayment,
        cause: EngineError,
    ) -> Result<(), EngineError> {
        tracing::error!(
            payment_id = %payment.id(),
            error = %cause,
            "option grant failed after premium settlement, rolling back payment"
        );

        let Some(gateway_ref) = payment.gateway_ref() else {
            return Err(EngineError::RollbackFailed {
                payment_id: payment.id().to_string(),
                stage: cause.to_string(),
                reason: "no gateway reference recorded".to_string(),
            });
        };

        match self.banking.reject_payment(gateway_ref).await {
            Ok(()) => Err(cause),
            Err(reject_err) => Err(EngineError::RollbackFailed {
                payment_id: payment.id().to_string(),
                stage: cause.to_string(),
                reason: reject_err.to_string(),
            }),
        }
    }

    /// The premium was rejected: release the reservation and reopen the
    /// offer for renegotiation.
    ///
    /// # Errors
    ///
    /// Returns error if the offer or the seller's portfolio entry is
    /// missing, or the reserved quantity is inconsistent.
    pub async fn handle_premium_failure(
        &self,
        payment: &TrackedPayment,
    ) -> Result<(), EngineError> {
        let offer_id = OfferId::new(payment.tracked_entity_id());
        let _offer_guard = self.locks.acquire(offer_key(&offer_id)).await;

        let mut offer = self.load_offer(&offer_id).await?;

        let _entry_guard = self
            .locks
            .acquire(portfolio_key(offer.seller_id(), offer.symbol()))
            .await;

        let mut entry = self
            .portfolios
            .find_by_user_and_symbol(offer.seller_id(), offer.symbol())
            .await?
            .ok_or_else(|| {
                EngineError::Portfolio(PortfolioError::EntryNotFound {
                    reference: format!("{}/{}", offer.seller_id(), offer.symbol()),
                })
            })?;

        self.ledger.release_to_public(&mut entry, offer.amount())?;
        self.portfolios.save(&entry).await?;

        offer.revert_to_pending()?;
        self.offers.save(&offer).await?;

        tracing::warn!(
            offer_id = %offer_id,
            payment_id = %payment.id(),
            "premium payment failed, offer reopened"
        );
        Ok(())
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    async fn load_offer(&self, offer_id: &OfferId) -> Result<OtcOffer, EngineError> {
        self.offers.find_by_id(offer_id).await?.ok_or_else(|| {
            EngineError::Negotiation(NegotiationError::OfferNotFound {
                offer_id: offer_id.to_string(),
            })
        })
    }

    async fn settlement_account(
        &self,
        user_id: &UserId,
    ) -> Result<SettlementAccount, EngineError> {
        self.banking
            .settlement_account(user_id)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound {
                user_id: user_id.to_string(),
            })
    }

    async fn resolve_display_name(&self, user_id: &UserId) -> String {
        if let Ok(name) = self.identity.client_by_id(user_id).await {
            return name.display();
        }
        match self.identity.employee_by_id(user_id).await {
            Ok(name) => name.display(),
            Err(e) => {
                tracing::debug!(user_id = %user_id, error = %e, "identity resolution failed");
                UNKNOWN_USER.to_string()
            }
        }
    }
}

fn offer_key(offer_id: &OfferId) -> String {
    format!("offer/{offer_id}")
}

fn portfolio_key(user_id: &UserId, symbol: &Symbol) -> String {
    format!("portfolio/{user_id}/{symbol}")
}

fn premium_instruction(
    offer: &OtcOffer,
    buyer_account: SettlementAccount,
    seller_account: SettlementAccount,
    payment: &TrackedPayment,
) -> PaymentInstruction {
    PaymentInstruction {
        sender: buyer_account,
        receiver: seller_account,
        amount: offer.premium(),
        code: PREMIUM_PAYMENT_CODE.to_string(),
        purpose: format!("OTC option premium, offer {}", offer.id()),
        reference: payment.id().to_string(),
        client_id: offer.buyer_id().clone(),
    }
}

/// Registers the negotiation service as the `OTC_CREATE_OPTION` handler.
pub struct PremiumSagaHandler<O, Q, P, T, B, I>
where
    O: OfferRepository,
    Q: OptionRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
    I: IdentityPort,
{
    service: Arc<OfferNegotiationService<O, Q, P, T, B, I>>,
}

impl<O, Q, P, T, B, I> PremiumSagaHandler<O, Q, P, T, B, I>
where
    O: OfferRepository,
    Q: OptionRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
    I: IdentityPort,
{
    /// Wrap the service for handler registration.
    pub fn new(service: Arc<OfferNegotiationService<O, Q, P, T, B, I>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<O, Q, P, T, B, I> SagaCompletionHandler for PremiumSagaHandler<O, Q, P, T, B, I>
where
    O: OfferRepository,
    Q: OptionRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
    I: IdentityPort,
{
    async fn on_success(&self, payment: &TrackedPayment) -> Result<(), EngineError> {
        self.service.handle_premium_success(payment).await
    }

    async fn on_failure(&self, payment: &TrackedPayment) -> Result<(), EngineError> {
        self.service.handle_premium_failure(payment).await
    }
}
