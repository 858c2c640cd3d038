//! Banking adapters.

/// Mock banking gateway for testing and development.
pub mod mock;

pub use mock::MockBankingGateway;
