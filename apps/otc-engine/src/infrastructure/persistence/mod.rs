//! Persistence adapters.

/// In-memory repositories.
pub mod in_memory;

pub use in_memory::{
    InMemoryOfferRepository, InMemoryOptionRepository, InMemoryPortfolioRepository,
    InMemoryTrackedPaymentRepository,
};
