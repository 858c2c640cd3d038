//! Shared value objects.

/// Strongly-typed entity identifiers.
pub mod identifiers;

/// Monetary amounts.
pub mod money;

/// Whole-share quantities.
pub mod share_count;

/// Security ticker symbols.
pub mod symbol;

/// Timestamps and settlement dates.
pub mod timestamp;

pub use identifiers::{EntryId, GatewayRef, OfferId, OptionId, PaymentId, UserId};
pub use money::Money;
pub use share_count::ShareCount;
pub use symbol::Symbol;
pub use timestamp::{SettlementDate, Timestamp};
