//! Option lifecycle context.
//!
//! Owns the `OtcOption` aggregate: the executable contract created once
//! an offer is accepted and its premium settles. Status is monotonic
//! VALID → USED or VALID → EXPIRED.

/// The `OtcOption` aggregate root.
pub mod aggregate;

/// Option errors.
pub mod errors;

/// Option repository trait.
pub mod repository;

/// Option status and filter value objects.
pub mod value_objects;

pub use aggregate::{GrantOptionCommand, OtcOption};
pub use errors::OptionError;
pub use repository::OptionRepository;
pub use value_objects::{OptionFilter, OptionStatus};
