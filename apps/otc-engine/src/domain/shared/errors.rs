//! Shared domain errors.

use std::fmt;

/// Validation errors for shared value objects.
///
/// These errors are independent of any bounded context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid value for a field.
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Arithmetic overflow or underflow.
    ArithmeticOverflow {
        /// Operation description.
        operation: String,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::ArithmeticOverflow { operation } => {
                write!(f, "Arithmetic overflow in {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display() {
        let err = DomainError::InvalidValue {
            field: "amount".to_string(),
            message: "must be positive".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("amount"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn overflow_display() {
        let err = DomainError::ArithmeticOverflow {
            operation: "reserve".to_string(),
        };
        assert!(format!("{err}").contains("reserve"));
    }

    #[test]
    fn domain_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(DomainError::InvalidValue {
            field: "x".to_string(),
            message: "y".to_string(),
        });
        assert!(!err.to_string().is_empty());
    }
}
