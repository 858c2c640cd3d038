//! Payment saga context.
//!
//! Owns `TrackedPayment` records, which correlate asynchronous bank
//! callbacks with the domain action the payment was made for. Completion
//! routing is purpose-keyed: each `PaymentPurpose` maps to exactly one
//! registered handler at the application layer.

/// Tracked payment values (purpose, status).
pub mod value_objects;

/// Payment saga errors.
pub mod errors;

/// The `TrackedPayment` aggregate root.
pub mod tracked_payment;

/// Tracked payment repository trait.
pub mod repository;

pub use errors::SagaError;
pub use repository::TrackedPaymentRepository;
pub use tracked_payment::TrackedPayment;
pub use value_objects::{PaymentPurpose, PaymentStatus};
