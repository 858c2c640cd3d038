//! Application services.
//!
//! Generic over repository and port implementations, injected as `Arc`s
//! at construction. The saga coordinator is purpose-agnostic; the
//! negotiation and lifecycle services register their completion handlers
//! with it at startup.

/// Per-entity lock registry.
pub mod locks;

/// Payment saga coordination and handler registry.
pub mod saga_coordinator;

/// Offer negotiation use cases and premium saga handlers.
pub mod negotiation;

/// Option lifecycle use cases and exercise saga handlers.
pub mod option_lifecycle;

/// Periodic expiration sweep.
pub mod expiration_sweep;

pub use expiration_sweep::ExpirationSweepService;
pub use locks::EntityLocks;
pub use negotiation::{ActiveOfferView, OfferNegotiationService, PremiumSagaHandler};
pub use option_lifecycle::{ExerciseSagaHandler, OptionLifecycleService, SweepOutcome};
pub use saga_coordinator::{PaymentSagaCoordinator, SagaCompletionHandler};
