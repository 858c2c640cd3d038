//! Portfolio repository trait.

use async_trait::async_trait;

use super::entry::PortfolioEntry;
use super::errors::PortfolioError;
use crate::domain::shared::{EntryId, Symbol, UserId};

/// Repository for `PortfolioEntry` aggregates.
#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    /// Persist an entry (insert or update).
    async fn save(&self, entry: &PortfolioEntry) -> Result<(), PortfolioError>;

    /// Find an entry by ID.
    async fn find_by_id(&self, id: &EntryId) -> Result<Option<PortfolioEntry>, PortfolioError>;

    /// Find a user's entry for one security.
    ///
    /// At most one entry exists per (user, symbol) pair.
    async fn find_by_user_and_symbol(
        &self,
        user_id: &UserId,
        symbol: &Symbol,
    ) -> Result<Option<PortfolioEntry>, PortfolioError>;
}
