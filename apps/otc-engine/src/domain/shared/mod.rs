//! Shared domain primitives.

/// Shared domain errors.
pub mod errors;

/// Value objects (IDs, money, quantities, time).
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::{
    EntryId, GatewayRef, Money, OfferId, OptionId, PaymentId, SettlementDate, ShareCount, Symbol,
    Timestamp, UserId,
};
