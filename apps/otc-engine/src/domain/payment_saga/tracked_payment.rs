//! TrackedPayment Aggregate Root
//!
//! Created PENDING before the gateway call so the callback can always
//! be correlated. The payment ID is embedded in the gateway reference
//! field; the gateway's own reference is attached once the call is
//! accepted, so a later rollback knows what to reject.

use serde::{Deserialize, Serialize};

use super::errors::SagaError;
use super::value_objects::{PaymentPurpose, PaymentStatus};
use crate::domain::shared::{GatewayRef, PaymentId, Timestamp};

/// One payment in flight through the external gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedPayment {
    id: PaymentId,
    purpose: PaymentPurpose,
    tracked_entity_id: String,
    secondary_entity_id: Option<String>,
    gateway_ref: Option<GatewayRef>,
    status: PaymentStatus,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl TrackedPayment {
    /// Create a PENDING payment tracking one entity.
    #[must_use]
    pub fn new(purpose: PaymentPurpose, tracked_entity_id: impl Into<String>) -> Self {
        Self {
            id: PaymentId::generate(),
            purpose,
            tracked_entity_id: tracked_entity_id.into(),
            secondary_entity_id: None,
            gateway_ref: None,
            status: PaymentStatus::Pending,
            created_at: Timestamp::now(),
            completed_at: None,
        }
    }

    /// Create a PENDING payment tracking a primary and a secondary entity.
    ///
    /// The exercise saga uses this to carry both the option and its
    /// originating offer.
    #[must_use]
    pub fn with_secondary(
        purpose: PaymentPurpose,
        tracked_entity_id: impl Into<String>,
        secondary_entity_id: impl Into<String>,
    ) -> Self {
        let mut payment = Self::new(purpose, tracked_entity_id);
        payment.secondary_entity_id = Some(secondary_entity_id.into());
        payment
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the payment ID.
    #[must_use]
    pub const fn id(&self) -> &PaymentId {
        &self.id
    }

    /// What the payment was made for.
    #[must_use]
    pub const fn purpose(&self) -> PaymentPurpose {
        self.purpose
    }

    /// ID of the entity the payment settles (offer, option, order).
    #[must_use]
    pub fn tracked_entity_id(&self) -> &str {
        &self.tracked_entity_id
    }

    /// Optional second entity carried for completion handling.
    #[must_use]
    pub fn secondary_entity_id(&self) -> Option<&str> {
        self.secondary_entity_id.as_deref()
    }

    /// The gateway's reference, once the call was accepted.
    #[must_use]
    pub const fn gateway_ref(&self) -> Option<&GatewayRef> {
        self.gateway_ref.as_ref()
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Completion time, if terminal.
    #[must_use]
    pub const fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    /// Whether the payment has reached a terminal status.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    // ========================================================================
    // State transitions
    // ========================================================================

    /// Record the gateway's reference after synchronous acceptance.
    pub fn attach_gateway_ref(&mut self, reference: GatewayRef) {
        self.gateway_ref = Some(reference);
    }

    /// Move the payment to its terminal status.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCompleted` if the payment is already terminal.
    /// Callers treat that as a duplicate callback and drop it.
    pub fn complete(&mut self, succeeded: bool) -> Result<(), SagaError> {
        if self.status.is_terminal() {
            return Err(SagaError::AlreadyCompleted {
                payment_id: self.id.as_str().to_string(),
                status: self.status,
            });
        }
        self.status = if succeeded {
            PaymentStatus::Success
        } else {
            PaymentStatus::Fail
        };
        self.completed_at = Some(Timestamp::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> TrackedPayment {
        TrackedPayment::new(PaymentPurpose::OtcCreateOption, "offer-1")
    }

    #[test]
    fn new_payment_is_pending() {
        let p = payment();
        assert_eq!(p.status(), PaymentStatus::Pending);
        assert_eq!(p.tracked_entity_id(), "offer-1");
        assert!(p.secondary_entity_id().is_none());
        assert!(p.gateway_ref().is_none());
        assert!(p.completed_at().is_none());
    }

    #[test]
    fn with_secondary_carries_both_entities() {
        let p = TrackedPayment::with_secondary(PaymentPurpose::OtcExercise, "option-1", "offer-1");
        assert_eq!(p.tracked_entity_id(), "option-1");
        assert_eq!(p.secondary_entity_id(), Some("offer-1"));
    }

    #[test]
    fn complete_success() {
        let mut p = payment();
        p.complete(true).unwrap();
        assert_eq!(p.status(), PaymentStatus::Success);
        assert!(p.completed_at().is_some());
    }

    #[test]
    fn complete_fail() {
        let mut p = payment();
        p.complete(false).unwrap();
        assert_eq!(p.status(), PaymentStatus::Fail);
    }

    #[test]
    fn duplicate_completion_is_rejected() {
        let mut p = payment();
        p.complete(true).unwrap();

        let result = p.complete(true);
        assert!(matches!(result, Err(SagaError::AlreadyCompleted { .. })));
        // The terminal status never flips.
        let result = p.complete(false);
        assert!(matches!(result, Err(SagaError::AlreadyCompleted { .. })));
        assert_eq!(p.status(), PaymentStatus::Success);
    }

    #[test]
    fn attach_gateway_ref() {
        let mut p = payment();
        p.attach_gateway_ref(GatewayRef::new("bank-ref-42"));
        assert_eq!(p.gateway_ref().map(GatewayRef::as_str), Some("bank-ref-42"));
    }
}
