//! Payment Saga Coordinator
//!
//! Owns `TrackedPayment` records and routes the gateway's asynchronous
//! callbacks to the completion handler registered for the payment's
//! purpose. Handlers are registered at startup; subsystems plug in
//! without the coordinator knowing their domains.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::errors::EngineError;
use crate::domain::payment_saga::{
    PaymentPurpose, SagaError, TrackedPayment, TrackedPaymentRepository,
};
use crate::domain::shared::PaymentId;

/// Completion callbacks for one payment purpose.
///
/// Success runs after the bank settled the payment; failure runs after
/// the bank rejected it. Both receive the terminal `TrackedPayment`.
#[async_trait]
pub trait SagaCompletionHandler: Send + Sync {
    /// React to a settled payment.
    async fn on_success(&self, payment: &TrackedPayment) -> Result<(), EngineError>;

    /// React to a rejected payment (compensation).
    async fn on_failure(&self, payment: &TrackedPayment) -> Result<(), EngineError>;
}

/// Coordinates payment sagas: records, terminal transitions, dispatch.
pub struct PaymentSagaCoordinator<T>
where
    T: TrackedPaymentRepository,
{
    payments: Arc<T>,
    handlers: RwLock<HashMap<PaymentPurpose, Arc<dyn SagaCompletionHandler>>>,
}

impl<T> PaymentSagaCoordinator<T>
where
    T: TrackedPaymentRepository,
{
    /// Create a coordinator with no registered handlers.
    pub fn new(payments: Arc<T>) -> Self {
        Self {
            payments,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register the completion handler for one purpose.
    ///
    /// Called once per purpose at startup; a later registration replaces
    /// the earlier one.
    pub fn register_handler(&self, purpose: PaymentPurpose, handler: Arc<dyn SagaCompletionHandler>) {
        let mut handlers = self.handlers.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        if handlers.insert(purpose, handler).is_some() {
            tracing::warn!(%purpose, "replacing registered saga handler");
        }
    }

    /// Persist a new PENDING payment before the gateway call.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    pub async fn begin(&self, payment: TrackedPayment) -> Result<TrackedPayment, EngineError> {
        self.payments.save(&payment).await?;
        tracing::info!(
            payment_id = %payment.id(),
            purpose = %payment.purpose(),
            entity_id = %payment.tracked_entity_id(),
            "tracked payment created"
        );
        Ok(payment)
    }

    /// Persist the payment again after the gateway accepted it.
    ///
    /// Called once the gateway reference is attached.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    pub async fn record_dispatch(&self, payment: &TrackedPayment) -> Result<(), EngineError> {
        self.payments.save(payment).await?;
        Ok(())
    }

    /// Mark a payment FAIL without running its failure handler.
    ///
    /// Used when the gateway refuses a payment synchronously: the caller
    /// compensates inline and the saga never reaches the bank.
    ///
    /// # Errors
    ///
    /// Returns error if the payment is missing, already terminal, or
    /// persistence fails.
    pub async fn abort(&self, payment_id: &PaymentId) -> Result<(), EngineError> {
        let mut payment = self.load(payment_id).await?;
        payment.complete(false)?;
        self.payments.save(&payment).await?;
        tracing::info!(payment_id = %payment_id, "tracked payment aborted before dispatch");
        Ok(())
    }

    /// Callback entry point: the bank settled the payment.
    ///
    /// Duplicate callbacks for an already-terminal payment are dropped
    /// with a warning, keeping handler side effects at-most-once.
    ///
    /// # Errors
    ///
    /// Returns error if the payment is unknown, no handler is registered
    /// for its purpose, or the handler fails.
    pub async fn mark_as_success(&self, payment_id: &PaymentId) -> Result<(), EngineError> {
        self.complete(payment_id, true).await
    }

    /// Callback entry point: the bank rejected the payment.
    ///
    /// Same idempotency guarantee as [`Self::mark_as_success`].
    ///
    /// # Errors
    ///
    /// Returns error if the payment is unknown, no handler is registered
    /// for its purpose, or the handler fails.
    pub async fn mark_as_fail(&self, payment_id: &PaymentId) -> Result<(), EngineError> {
        self.complete(payment_id, false).await
    }

    async fn complete(&self, payment_id: &PaymentId, succeeded: bool) -> Result<(), EngineError> {
        let mut payment = self.load(payment_id).await?;

        if let Err(SagaError::AlreadyCompleted { status, .. }) = payment.complete(succeeded) {
            tracing::warn!(
                payment_id = %payment_id,
                %status,
                "duplicate payment callback dropped"
            );
            return Ok(());
        }

        // Terminal status is persisted before the handler runs, so a
        // re-delivered callback hits the guard even if the handler fails.
        self.payments.save(&payment).await?;

        let handler = self.handler_for(payment.purpose())?;
        let result = if succeeded {
            handler.on_success(&payment).await
        } else {
            handler.on_failure(&payment).await
        };

        match &result {
            Ok(()) => tracing::info!(
                payment_id = %payment_id,
                purpose = %payment.purpose(),
                succeeded,
                "payment saga completed"
            ),
            Err(e) => tracing::error!(
                payment_id = %payment_id,
                purpose = %payment.purpose(),
                succeeded,
                error = %e,
                "payment completion handler failed"
            ),
        }
        result
    }

    async fn load(&self, payment_id: &PaymentId) -> Result<TrackedPayment, EngineError> {
        self.payments
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| {
                EngineError::Saga(SagaError::PaymentNotFound {
                    payment_id: payment_id.to_string(),
                })
            })
    }

    fn handler_for(
        &self,
        purpose: PaymentPurpose,
    ) -> Result<Arc<dyn SagaCompletionHandler>, EngineError> {
        let handlers = self.handlers.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        handlers
            .get(&purpose)
            .cloned()
            .ok_or(EngineError::Saga(SagaError::NoHandlerRegistered { purpose }))
    }
}
