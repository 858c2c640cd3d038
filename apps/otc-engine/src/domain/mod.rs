//! Domain layer.
//!
//! Bounded contexts for OTC option trading. Each context owns its
//! aggregate, value objects, errors, and repository trait.

/// Shared value objects and errors used across contexts.
pub mod shared;

/// Offer negotiation context (`OtcOffer` state machine).
pub mod negotiation;

/// Option lifecycle context (`OtcOption` state machine).
pub mod option_contract;

/// Portfolio holdings and reservation ledger.
pub mod portfolio;

/// Payment saga records (`TrackedPayment`).
pub mod payment_saga;
