//! Dependency Injection Container
//!
//! Creates and wires the engine's components: repositories, ports,
//! services, and the saga handler registry. All collaborators are
//! constructor-injected; nothing is looked up ambiently.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{BankingPort, IdentityPort};
use crate::application::services::{
    EntityLocks, ExerciseSagaHandler, ExpirationSweepService, OfferNegotiationService,
    OptionLifecycleService, PaymentSagaCoordinator, PremiumSagaHandler,
};
use crate::domain::negotiation::repository::OfferRepository;
use crate::domain::option_contract::repository::OptionRepository;
use crate::domain::payment_saga::{PaymentPurpose, TrackedPaymentRepository};
use crate::domain::portfolio::repository::PortfolioRepository;
use crate::domain::portfolio::ReservationLedger;
use crate::infrastructure::banking::MockBankingGateway;
use crate::infrastructure::identity::StaticIdentityDirectory;
use crate::infrastructure::persistence::{
    InMemoryOfferRepository, InMemoryOptionRepository, InMemoryPortfolioRepository,
    InMemoryTrackedPaymentRepository,
};

/// Dependency injection container.
///
/// Holds all wired dependencies. The premium and exercise saga handlers
/// are registered with the coordinator during construction.
pub struct Container<O, Q, P, T, B, I>
where
    O: OfferRepository + 'static,
    Q: OptionRepository + 'static,
    P: PortfolioRepository + 'static,
    T: TrackedPaymentRepository + 'static,
    B: BankingPort + 'static,
    I: IdentityPort + 'static,
{
    offers: Arc<O>,
    options: Arc<Q>,
    portfolios: Arc<P>,
    payments: Arc<T>,
    banking: Arc<B>,
    identity: Arc<I>,
    saga: Arc<PaymentSagaCoordinator<T>>,
    negotiation: Arc<OfferNegotiationService<O, Q, P, T, B, I>>,
    lifecycle: Arc<OptionLifecycleService<Q, O, P, T, B>>,
}

impl<O, Q, P, T, B, I> Container<O, Q, P, T, B, I>
where
    O: OfferRepository + 'static,
    Q: OptionRepository + 'static,
    P: PortfolioRepository + 'static,
    T: TrackedPaymentRepository + 'static,
    B: BankingPort + 'static,
    I: IdentityPort + 'static,
{
    /// Wire the engine from its repositories and ports.
    pub fn new(
        offers: Arc<O>,
        options: Arc<Q>,
        portfolios: Arc<P>,
        payments: Arc<T>,
        banking: Arc<B>,
        identity: Arc<I>,
    ) -> Self {
        let locks = Arc::new(EntityLocks::new());
        let ledger = ReservationLedger::new();
        let saga = Arc::new(PaymentSagaCoordinator::new(Arc::clone(&payments)));

        let negotiation = Arc::new(OfferNegotiationService::new(
            Arc::clone(&offers),
            Arc::clone(&options),
            Arc::clone(&portfolios),
            ledger,
            Arc::clone(&saga),
            Arc::clone(&banking),
            Arc::clone(&identity),
            Arc::clone(&locks),
        ));
        let lifecycle = Arc::new(OptionLifecycleService::new(
            Arc::clone(&options),
            Arc::clone(&offers),
            Arc::clone(&portfolios),
            ledger,
            Arc::clone(&saga),
            Arc::clone(&banking),
            Arc::clone(&locks),
        ));

        saga.register_handler(
            PaymentPurpose::OtcCreateOption,
            Arc::new(PremiumSagaHandler::new(Arc::clone(&negotiation))),
        );
        saga.register_handler(
            PaymentPurpose::OtcExercise,
            Arc::new(ExerciseSagaHandler::new(Arc::clone(&lifecycle))),
        );

        Self {
            offers,
            options,
            portfolios,
            payments,
            banking,
            identity,
            saga,
            negotiation,
            lifecycle,
        }
    }

    /// Get the offer repository.
    pub fn offers(&self) -> Arc<O> {
        Arc::clone(&self.offers)
    }

    /// Get the option repository.
    pub fn options(&self) -> Arc<Q> {
        Arc::clone(&self.options)
    }

    /// Get the portfolio repository.
    pub fn portfolios(&self) -> Arc<P> {
        Arc::clone(&self.portfolios)
    }

    /// Get the tracked payment repository.
    pub fn payments(&self) -> Arc<T> {
        Arc::clone(&self.payments)
    }

    /// Get the banking port.
    pub fn banking(&self) -> Arc<B> {
        Arc::clone(&self.banking)
    }

    /// Get the identity port.
    pub fn identity(&self) -> Arc<I> {
        Arc::clone(&self.identity)
    }

    /// Get the saga coordinator (callback entry point).
    pub fn saga(&self) -> Arc<PaymentSagaCoordinator<T>> {
        Arc::clone(&self.saga)
    }

    /// Get the offer negotiation service.
    pub fn negotiation(&self) -> Arc<OfferNegotiationService<O, Q, P, T, B, I>> {
        Arc::clone(&self.negotiation)
    }

    /// Get the option lifecycle service.
    pub fn lifecycle(&self) -> Arc<OptionLifecycleService<Q, O, P, T, B>> {
        Arc::clone(&self.lifecycle)
    }

    /// Create the expiration sweep service ticking at `interval`.
    pub fn expiration_sweep(
        &self,
        interval: Duration,
    ) -> Arc<ExpirationSweepService<Q, O, P, T, B>> {
        Arc::new(ExpirationSweepService::new(
            Arc::clone(&self.lifecycle),
            interval,
        ))
    }
}

/// Fully in-process wiring: in-memory repositories, mock gateway,
/// static identity directory.
pub type InMemoryContainer = Container<
    InMemoryOfferRepository,
    InMemoryOptionRepository,
    InMemoryPortfolioRepository,
    InMemoryTrackedPaymentRepository,
    MockBankingGateway,
    StaticIdentityDirectory,
>;

impl InMemoryContainer {
    /// Wire an engine backed entirely by in-process adapters.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryOfferRepository::new()),
            Arc::new(InMemoryOptionRepository::new()),
            Arc::new(InMemoryPortfolioRepository::new()),
            Arc::new(InMemoryTrackedPaymentRepository::new()),
            Arc::new(MockBankingGateway::new()),
            Arc::new(StaticIdentityDirectory::new()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_container_wires_handlers() {
        let container = InMemoryContainer::in_memory();

        // An unknown payment errors; a registered-handler gap would be a
        // different error class. This exercises the full wiring.
        let result = container
            .saga()
            .mark_as_success(&crate::domain::shared::PaymentId::new("missing"))
            .await;
        assert!(result.is_err());
    }
}
