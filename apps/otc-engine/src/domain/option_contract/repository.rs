//! Option repository trait.

use async_trait::async_trait;

use super::aggregate::OtcOption;
use super::errors::OptionError;
use super::value_objects::OptionFilter;
use crate::domain::shared::{OptionId, SettlementDate, UserId};

/// Repository for `OtcOption` aggregates.
#[async_trait]
pub trait OptionRepository: Send + Sync {
    /// Persist an option (insert or update).
    async fn save(&self, option: &OtcOption) -> Result<(), OptionError>;

    /// Find an option by ID.
    async fn find_by_id(&self, id: &OptionId) -> Result<Option<OtcOption>, OptionError>;

    /// All VALID options whose settlement date is strictly before `today`.
    ///
    /// Feed for the expiration sweep.
    async fn find_valid_expired_before(
        &self,
        today: SettlementDate,
    ) -> Result<Vec<OtcOption>, OptionError>;

    /// All options where the user is buyer or seller, matching the filter.
    async fn find_for_user(
        &self,
        user_id: &UserId,
        filter: OptionFilter,
    ) -> Result<Vec<OtcOption>, OptionError>;
}
