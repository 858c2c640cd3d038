//! Option lifecycle errors.

use std::fmt;

use super::value_objects::OptionStatus;

/// Errors that can occur in the option lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// Option not found.
    NotFound {
        /// Option ID.
        option_id: String,
    },

    /// The acting user is not the option holder.
    UnauthorizedAccess {
        /// Acting user.
        user_id: String,
    },

    /// The option was already exercised.
    AlreadyExercised {
        /// Option ID.
        option_id: String,
    },

    /// The settlement date has passed or the option already expired.
    SettlementExpired {
        /// Option ID.
        option_id: String,
    },

    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current status.
        from: OptionStatus,
        /// Attempted status.
        to: OptionStatus,
    },
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { option_id } => {
                write!(f, "Option not found: {option_id}")
            }
            Self::UnauthorizedAccess { user_id } => {
                write!(f, "User {user_id} does not hold this option")
            }
            Self::AlreadyExercised { option_id } => {
                write!(f, "Option already exercised: {option_id}")
            }
            Self::SettlementExpired { option_id } => {
                write!(f, "Option settlement date has passed: {option_id}")
            }
            Self::InvalidStateTransition { from, to } => {
                write!(f, "Invalid option state transition: {from} -> {to}")
            }
        }
    }
}

impl std::error::Error for OptionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = OptionError::NotFound {
            option_id: "opt-1".to_string(),
        };
        assert!(format!("{err}").contains("opt-1"));
    }

    #[test]
    fn unauthorized_display() {
        let err = OptionError::UnauthorizedAccess {
            user_id: "user-1".to_string(),
        };
        assert!(format!("{err}").contains("user-1"));
    }

    #[test]
    fn invalid_transition_display() {
        let err = OptionError::InvalidStateTransition {
            from: OptionStatus::Used,
            to: OptionStatus::Expired,
        };
        let msg = format!("{err}");
        assert!(msg.contains("USED"));
        assert!(msg.contains("EXPIRED"));
    }
}
