// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! OTC Engine - Core Library
//!
//! Negotiation and payment-saga engine for over-the-counter stock options.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, repositories)
//!   - `negotiation`: `OtcOffer` aggregate, turn-based counter/accept/reject/cancel
//!   - `option_contract`: `OtcOption` aggregate, exercise eligibility, expiry
//!   - `portfolio`: `PortfolioEntry` holdings, reservation ledger
//!   - `payment_saga`: `TrackedPayment` records correlating bank callbacks
//!
//! - **Application**: Services and orchestration
//!   - `ports`: Interfaces for external systems (`BankingPort`, `IdentityPort`)
//!   - `services`: `OfferNegotiationService`, `OptionLifecycleService`,
//!     `PaymentSagaCoordinator`, `ExpirationSweepService`
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: In-memory repositories
//!   - `banking` / `identity`: Mock collaborator adapters
//!   - `config`: Dependency injection container

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Services and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Engine configuration.
pub mod config;

/// Tracing/logging initialization.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::negotiation::{OfferRepository, OfferStatus, OfferTerms, OtcOffer};
pub use domain::option_contract::{OptionFilter, OptionRepository, OptionStatus, OtcOption};
pub use domain::payment_saga::{
    PaymentPurpose, PaymentStatus, TrackedPayment, TrackedPaymentRepository,
};
pub use domain::portfolio::{PortfolioEntry, PortfolioRepository, ReservationLedger};
pub use domain::shared::{
    EntryId, GatewayRef, Money, OfferId, OptionId, PaymentId, SettlementDate, ShareCount, Symbol,
    Timestamp, UserId,
};

// Application re-exports
pub use application::errors::{EngineError, ErrorKind};
pub use application::ports::{
    AccountKind, BankingError, BankingPort, IdentityError, IdentityPort, PartyName,
    PaymentInstruction, SettlementAccount,
};
pub use application::services::{
    ActiveOfferView, EntityLocks, ExpirationSweepService, OfferNegotiationService,
    OptionLifecycleService, PaymentSagaCoordinator, SagaCompletionHandler, SweepOutcome,
};

// Infrastructure re-exports
pub use infrastructure::banking::MockBankingGateway;
pub use infrastructure::config::{Container, InMemoryContainer};
pub use infrastructure::identity::StaticIdentityDirectory;
pub use infrastructure::persistence::{
    InMemoryOfferRepository, InMemoryOptionRepository, InMemoryPortfolioRepository,
    InMemoryTrackedPaymentRepository,
};
