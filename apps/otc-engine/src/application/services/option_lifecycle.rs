//! Option Lifecycle Service
//!
//! Orchestrates the `OtcOption` state machine: exercising (with the
//! strike payment saga), expiration, and listing. Exercise is
//! request-response only up to "payment dispatched"; holdings transfer
//! and status changes happen in the saga's success handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::EngineError;
use crate::application::ports::{BankingPort, PaymentInstruction, SettlementAccount};
use crate::application::services::locks::EntityLocks;
use crate::application::services::saga_coordinator::{
    PaymentSagaCoordinator, SagaCompletionHandler,
};
use crate::domain::negotiation::errors::NegotiationError;
use crate::domain::negotiation::repository::OfferRepository;
use crate::domain::option_contract::aggregate::OtcOption;
use crate::domain::option_contract::errors::OptionError;
use crate::domain::option_contract::repository::OptionRepository;
use crate::domain::option_contract::value_objects::{OptionFilter, OptionStatus};
use crate::domain::payment_saga::{PaymentPurpose, TrackedPayment, TrackedPaymentRepository};
use crate::domain::negotiation::aggregate::OtcOffer;
use crate::domain::portfolio::repository::PortfolioRepository;
use crate::domain::portfolio::{PortfolioEntry, PortfolioError, ReservationLedger};
use crate::domain::shared::{OfferId, OptionId, SettlementDate, Symbol, UserId};

/// Bank payment code for strike settlements.
const EXERCISE_PAYMENT_CODE: &str = "289";

/// Outcome of one expiration sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Options moved to EXPIRED with reservations released.
    pub expired: usize,
    /// Options the sweep could not process this run.
    pub failed: usize,
}

/// Use-case service for the option lifecycle.
pub struct OptionLifecycleService<Q, O, P, T, B>
where
    Q: OptionRepository,
    O: OfferRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
{
    options: Arc<Q>,
    offers: Arc<O>,
    portfolios: Arc<P>,
    ledger: ReservationLedger,
    saga: Arc<PaymentSagaCoordinator<T>>,
    banking: Arc<B>,
    locks: Arc<EntityLocks>,
}

impl<Q, O, P, T, B> OptionLifecycleService<Q, O, P, T, B>
where
    Q: OptionRepository,
    O: OfferRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
{
    /// Create a new lifecycle service.
    pub fn new(
        options: Arc<Q>,
        offers: Arc<O>,
        portfolios: Arc<P>,
        ledger: ReservationLedger,
        saga: Arc<PaymentSagaCoordinator<T>>,
        banking: Arc<B>,
        locks: Arc<EntityLocks>,
    ) -> Self {
        Self {
            options,
            offers,
            portfolios,
            ledger,
            saga,
            banking,
            locks,
        }
    }

    /// Exercise a VALID option: dispatch the strike payment.
    ///
    /// Eligibility is checked in full before any money moves. On a
    /// synchronous gateway refusal the option stays VALID so the holder
    /// may retry.
    ///
    /// # Errors
    ///
    /// Returns error if the option is missing, the actor is not the
    /// holder, the option is USED or EXPIRED, the settlement date has
    /// passed, a settlement account is missing, or the payment is
    /// refused.
    pub async fn exercise_option(
        &self,
        option_id: &OptionId,
        actor: &UserId,
    ) -> Result<OtcOption, EngineError> {
        let _guard = self.locks.acquire(option_key(option_id)).await;

        let option = self.load_option(option_id).await?;
        option.ensure_exercisable(actor, SettlementDate::today())?;

        // Seller resolved first; its absence is the primary diagnosis.
        let seller_account = self.settlement_account(option.seller_id()).await?;
        let buyer_account = self.settlement_account(option.buyer_id()).await?;

        let mut payment = self
            .saga
            .begin(TrackedPayment::with_secondary(
                PaymentPurpose::OtcExercise,
                option.id().as_str(),
                option.offer_id().as_str(),
            ))
            .await?;

        let total = option.exercise_total();
        let instruction = PaymentInstruction {
            sender: buyer_account,
            receiver: seller_account,
            amount: total,
            code: EXERCISE_PAYMENT_CODE.to_string(),
            purpose: format!("OTC option exercise, option {}", option.id()),
            reference: payment.id().to_string(),
            client_id: option.buyer_id().clone(),
        };

        match self.banking.execute_system_payment(instruction).await {
            Ok(gateway_ref) => {
                payment.attach_gateway_ref(gateway_ref);
                self.saga.record_dispatch(&payment).await?;
                tracing::info!(
                    option_id = %option_id,
                    payment_id = %payment.id(),
                    total = %total,
                    "exercise payment dispatched"
                );
                Ok(option)
            }
            Err(e) => {
                // The option never left VALID; the holder may retry.
                tracing::warn!(option_id = %option_id, error = %e, "exercise payment refused");
                self.saga.abort(payment.id()).await?;
                Err(EngineError::Banking(e))
            }
        }
    }

    /// All options where the user is a party, filtered by validity.
    ///
    /// # Errors
    ///
    /// Returns error if the repository fails.
    pub async fn list_options_for_user(
        &self,
        user_id: &UserId,
        filter: OptionFilter,
    ) -> Result<Vec<OtcOption>, EngineError> {
        Ok(self.options.find_for_user(user_id, filter).await?)
    }

    /// Expire every VALID option whose settlement date has passed.
    ///
    /// Reservations return to the seller's private holdings, not the
    /// public pool. One bad row does not abort the run; failures are
    /// logged and counted.
    ///
    /// # Errors
    ///
    /// Returns error only if the candidate query itself fails.
    pub async fn check_expirations(&self) -> Result<SweepOutcome, EngineError> {
        let today = SettlementDate::today();
        let candidates = self.options.find_valid_expired_before(today).await?;

        let mut outcome = SweepOutcome::default();
        for candidate in candidates {
            match self.expire_one(candidate.id()).await {
                Ok(true) => outcome.expired += 1,
                Ok(false) => {}
                Err(e) => {
                    outcome.failed += 1;
                    tracing::error!(
                        option_id = %candidate.id(),
                        error = %e,
                        "failed to expire option"
                    );
                }
            }
        }

        if outcome.expired > 0 || outcome.failed > 0 {
            tracing::info!(
                expired = outcome.expired,
                failed = outcome.failed,
                "expiration sweep finished"
            );
        }
        Ok(outcome)
    }

    /// Expire one option under its lock. Returns false if a concurrent
    /// transition already retired it.
    async fn expire_one(&self, option_id: &OptionId) -> Result<bool, EngineError> {
        let _option_guard = self.locks.acquire(option_key(option_id)).await;

        // Re-read under the lock; an exercise callback may have won.
        let mut option = self.load_option(option_id).await?;
        if option.status() != OptionStatus::Valid {
            return Ok(false);
        }

        let _entry_guard = self
            .locks
            .acquire(portfolio_key(option.seller_id(), option.symbol()))
            .await;

        let mut entry = self
            .seller_entry(option.seller_id(), option.symbol())
            .await?;
        self.ledger.release_to_private(&mut entry, option.amount())?;
        option.mark_expired()?;

        self.portfolios.save(&entry).await?;
        self.options.save(&option).await?;
        Ok(true)
    }

    // ========================================================================
    // Exercise saga completion
    // ========================================================================

    /// The strike settled: transfer holdings, retire option and offer.
    ///
    /// If domain state cannot be updated after the money moved, the
    /// payment is rolled back at the gateway; a rollback failure is
    /// escalated as unrecoverable.
    ///
    /// # Errors
    ///
    /// Returns the original failure once rolled back, or
    /// `RollbackFailed` when the gateway rejects the rollback too.
    pub async fn handle_exercise_success(
        &self,
        payment: &TrackedPayment,
    ) -> Result<(), EngineError> {
        let option_id = OptionId::new(payment.tracked_entity_id());
        let _guard = self.locks.acquire(option_key(&option_id)).await;

        match self.apply_exercise(&option_id).await {
            Ok(()) => {
                tracing::info!(option_id = %option_id, "exercise settled, holdings transferred");
                Ok(())
            }
            Err(e) => self.rollback_settled_payment(payment, e).await,
        }
    }

    /// The strike payment was rejected by the bank.
    ///
    /// The option never left VALID, so there is nothing to compensate;
    /// the holder may retry.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches the handler contract.
    pub async fn handle_exercise_failure(
        &self,
        payment: &TrackedPayment,
    ) -> Result<(), EngineError> {
        tracing::warn!(
            option_id = %payment.tracked_entity_id(),
            payment_id = %payment.id(),
            "exercise payment failed, option remains exercisable"
        );
        Ok(())
    }

    async fn apply_exercise(&self, option_id: &OptionId) -> Result<(), EngineError> {
        let mut option = self.load_option(option_id).await?;

        // Key-sorted acquisition: swapped-role settlements on the same
        // symbol contend on the same key first instead of deadlocking.
        let (_seller_guard, _buyer_guard) = self
            .locks
            .acquire_pair(
                portfolio_key(option.seller_id(), option.symbol()),
                portfolio_key(option.buyer_id(), option.symbol()),
            )
            .await;

        let mut seller_entry = self
            .seller_entry(option.seller_id(), option.symbol())
            .await?;
        let mut buyer_entry = self
            .portfolios
            .find_by_user_and_symbol(option.buyer_id(), option.symbol())
            .await?
            .unwrap_or_else(|| {
                PortfolioEntry::empty(option.buyer_id().clone(), option.symbol().clone())
            });

        self.ledger.transfer_ownership(
            &mut seller_entry,
            &mut buyer_entry,
            option.amount(),
            option.strike_price(),
        )?;

        option.mark_used()?;

        let offer_id = option.offer_id().clone();
        let mut offer = self.load_offer(&offer_id).await?;
        offer.mark_exercised()?;

        self.portfolios.save(&seller_entry).await?;
        self.portfolios.save(&buyer_entry).await?;
        self.options.save(&option).await?;
        self.offers.save(&offer).await?;
        Ok(())
    }

    /// Money settled but domain state could not follow: reject the
    /// payment at the gateway and surface the original failure.
    async fn rollback_settled_payment(
        &self,
        payment: &TrackedPayment,
        cause: EngineError,
    ) -> Result<(), EngineError> {
        tracing::error!(
            payment_id = %payment.id(),
            error = %cause,
            "exercise completion failed after settlement, rolling back payment"
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

    // ========================================================================
    // Private helpers
    // ========================================================================

    async fn load_option(&self, option_id: &OptionId) -> Result<OtcOption, EngineError> {
        self.options.find_by_id(option_id).await?.ok_or_else(|| {
            EngineError::Option(OptionError::NotFound {
                option_id: option_id.to_string(),
            })
        })
    }

    async fn load_offer(&self, offer_id: &OfferId) -> Result<OtcOffer, EngineError> {
        self.offers.find_by_id(offer_id).await?.ok_or_else(|| {
            EngineError::Negotiation(NegotiationError::OfferNotFound {
                offer_id: offer_id.to_string(),
            })
        })
    }

    async fn seller_entry(
        &self,
        seller_id: &UserId,
        symbol: &Symbol,
    ) -> Result<PortfolioEntry, EngineError> {
        self.portfolios
            .find_by_user_and_symbol(seller_id, symbol)
            .await?
            .ok_or_else(|| {
                EngineError::Portfolio(PortfolioError::EntryNotFound {
                    reference: format!("{seller_id}/{symbol}"),
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
}

fn option_key(option_id: &OptionId) -> String {
    format!("option/{option_id}")
}

fn portfolio_key(user_id: &UserId, symbol: &Symbol) -> String {
    format!("portfolio/{user_id}/{symbol}")
}

/// Registers the lifecycle service as the `OTC_EXERCISE` handler.
pub struct ExerciseSagaHandler<Q, O, P, T, B>
where
    Q: OptionRepository,
    O: OfferRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
{
    service: Arc<OptionLifecycleService<Q, O, P, T, B>>,
}

impl<Q, O, P, T, B> ExerciseSagaHandler<Q, O, P, T, B>
where
    Q: OptionRepository,
    O: OfferRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
{
    /// Wrap the service for handler registration.
    pub fn new(service: Arc<OptionLifecycleService<Q, O, P, T, B>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<Q, O, P, T, B> SagaCompletionHandler for ExerciseSagaHandler<Q, O, P, T, B>
where
    Q: OptionRepository,
    O: OfferRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
{
    async fn on_success(&self, payment: &TrackedPayment) -> Result<(), EngineError> {
        self.service.handle_exercise_success(payment).await
    }

    async fn on_failure(&self, payment: &TrackedPayment) -> Result<(), EngineError> {
        self.service.handle_exercise_failure(payment).await
    }
}
