//! Payment saga errors.

use std::fmt;

use super::value_objects::{PaymentPurpose, PaymentStatus};

/// Errors that can occur while tracking or completing payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SagaError {
    /// Tracked payment not found.
    PaymentNotFound {
        /// Payment ID.
        payment_id: String,
    },

    /// The payment is already in a terminal status.
    ///
    /// Duplicate callbacks hit this guard and are dropped, keeping
    /// completion side effects at-most-once.
    AlreadyCompleted {
        /// Payment ID.
        payment_id: String,
        /// Current terminal status.
        status: PaymentStatus,
    },

    /// No completion handler registered for the payment's purpose.
    NoHandlerRegistered {
        /// The unrouteable purpose.
        purpose: PaymentPurpose,
    },
}

impl fmt::Display for SagaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaymentNotFound { payment_id } => {
                write!(f, "Tracked payment not found: {payment_id}")
            }
            Self::AlreadyCompleted { payment_id, status } => {
                write!(f, "Payment {payment_id} is already {status}")
            }
            Self::NoHandlerRegistered { purpose } => {
                write!(f, "No completion handler registered for {purpose}")
            }
        }
    }
}

impl std::error::Error for SagaError {}
