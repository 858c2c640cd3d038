//! Offer negotiation context.
//!
//! Owns the `OtcOffer` aggregate: a negotiable proposal to trade a stock
//! option between two named users, advanced turn by turn until one side
//! accepts, rejects, or the author of the latest terms withdraws.

/// The `OtcOffer` aggregate root.
pub mod aggregate;

/// Negotiation errors.
pub mod errors;

/// Offer repository trait.
pub mod repository;

/// Offer status and terms value objects.
pub mod value_objects;

pub use aggregate::{OpenOfferCommand, OtcOffer};
pub use errors::NegotiationError;
pub use repository::OfferRepository;
pub use value_objects::{OfferStatus, OfferTerms};
