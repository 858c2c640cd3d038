//! Application Ports (Hexagonal Architecture)
//!
//! Driven ports: interfaces the engine calls on external collaborators.
//! Infrastructure provides the adapters.

/// Banking gateway port.
pub mod banking;

/// Identity resolver port.
pub mod identity;

pub use banking::{AccountKind, BankingError, BankingPort, PaymentInstruction, SettlementAccount};
pub use identity::{IdentityError, IdentityPort, PartyName};
