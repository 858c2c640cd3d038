//! Tracked payment repository trait.

use async_trait::async_trait;

use super::errors::SagaError;
use super::tracked_payment::TrackedPayment;
use crate::domain::shared::PaymentId;

/// Repository for `TrackedPayment` aggregates.
#[async_trait]
pub trait TrackedPaymentRepository: Send + Sync {
    /// Persist a payment (insert or update).
    async fn save(&self, payment: &TrackedPayment) -> Result<(), SagaError>;

    /// Find a payment by ID.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<TrackedPayment>, SagaError>;
}
