//! Portfolio holdings context.
//!
//! Owns per-user, per-security holdings and the
//! `public + reserved ≤ amount` invariant. The `ReservationLedger` is
//! the only mutation path for reserved quantities.

/// The `PortfolioEntry` aggregate root.
pub mod entry;

/// Portfolio errors.
pub mod errors;

/// Reservation bookkeeping service.
pub mod ledger;

/// Portfolio repository trait.
pub mod repository;

pub use entry::PortfolioEntry;
pub use errors::PortfolioError;
pub use ledger::ReservationLedger;
pub use repository::PortfolioRepository;
