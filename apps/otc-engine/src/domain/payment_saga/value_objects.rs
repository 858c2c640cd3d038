//! Value objects for the payment saga context.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a tracked payment was made for.
///
/// The purpose keys the completion dispatch table: every purpose routes
/// to exactly one registered handler. Order, commission, and tax
/// purposes belong to sibling subsystems that register their own
/// handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPurpose {
    /// Premium payment for an accepted OTC offer.
    OtcCreateOption,
    /// Strike payment for an exercised OTC option.
    OtcExercise,
    /// Settlement of a regular exchange order.
    OrderTransaction,
    /// Commission charged on an exchange order.
    OrderCommission,
    /// Tax remittance.
    TaxPayment,
}

impl fmt::Display for PaymentPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OtcCreateOption => "OTC_CREATE_OPTION",
            Self::OtcExercise => "OTC_EXERCISE",
            Self::OrderTransaction => "ORDER_TRANSACTION",
            Self::OrderCommission => "ORDER_COMMISSION",
            Self::TaxPayment => "TAX_PAYMENT",
        };
        write!(f, "{s}")
    }
}

/// Settlement status of a tracked payment.
///
/// SUCCESS and FAIL are terminal; a payment reaches a terminal status
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Dispatched to the gateway, awaiting the callback.
    Pending,
    /// The bank settled the payment. Terminal.
    Success,
    /// The bank rejected the payment. Terminal.
    Fail,
}

impl PaymentStatus {
    /// Whether the status can still change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Fail)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Fail => "FAIL",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_serde_screaming_snake() {
        let json = serde_json::to_string(&PaymentPurpose::OtcCreateOption).unwrap();
        assert_eq!(json, "\"OTC_CREATE_OPTION\"");
        let parsed: PaymentPurpose = serde_json::from_str("\"OTC_EXERCISE\"").unwrap();
        assert_eq!(parsed, PaymentPurpose::OtcExercise);
    }

    #[test]
    fn status_terminal() {
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Fail.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
    }

    #[test]
    fn purpose_display() {
        assert_eq!(format!("{}", PaymentPurpose::TaxPayment), "TAX_PAYMENT");
    }
}
