//! Identity Port (Driven Port)
//!
//! Interface for resolving counterparty display names. Lookups are
//! best-effort: listing code falls back to a placeholder rather than
//! failing the request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::shared::UserId;

/// A resolved display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyName {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
}

impl PartyName {
    /// "First Last" display form.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Errors from the identity resolver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// No record for the user in this directory.
    #[error("No identity record for user {user_id}")]
    NotFound {
        /// The unresolved user.
        user_id: String,
    },

    /// The resolver could not be reached.
    #[error("Identity resolver unavailable: {message}")]
    Unavailable {
        /// Transport-level detail.
        message: String,
    },
}

/// Port for the external identity resolver.
///
/// Clients and employees live in separate directories; callers try the
/// client lookup first and fall back to the employee lookup.
#[async_trait]
pub trait IdentityPort: Send + Sync {
    /// Resolve a client's name.
    ///
    /// # Errors
    ///
    /// Returns error if the user is not a client or the resolver is
    /// unreachable.
    async fn client_by_id(&self, user_id: &UserId) -> Result<PartyName, IdentityError>;

    /// Resolve an employee's name.
    ///
    /// # Errors
    ///
    /// Returns error if the user is not an employee or the resolver is
    /// unreachable.
    async fn employee_by_id(&self, user_id: &UserId) -> Result<PartyName, IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_names() {
        let name = PartyName {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };
        assert_eq!(name.display(), "Ada Lovelace");
    }
}
