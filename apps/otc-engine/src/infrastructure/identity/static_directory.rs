//! Static identity directory.
//!
//! In-process client and employee name tables. Lookup order (client
//! first, employee as fallback) is the caller's concern.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::ports::{IdentityError, IdentityPort, PartyName};
use crate::domain::shared::UserId;

/// Static implementation of `IdentityPort`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct StaticIdentityDirectory {
    clients: RwLock<HashMap<String, PartyName>>,
    employees: RwLock<HashMap<String, PartyName>>,
}

impl StaticIdentityDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client record.
    pub fn add_client(&self, user_id: &UserId, first_name: &str, last_name: &str) {
        self.clients.write().unwrap().insert(
            user_id.as_str().to_string(),
            PartyName {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );
    }

    /// Add an employee record.
    pub fn add_employee(&self, user_id: &UserId, first_name: &str, last_name: &str) {
        self.employees.write().unwrap().insert(
            user_id.as_str().to_string(),
            PartyName {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );
    }
}

#[async_trait]
impl IdentityPort for StaticIdentityDirectory {
    async fn client_by_id(&self, user_id: &UserId) -> Result<PartyName, IdentityError> {
        self.clients
            .read()
            .unwrap()
            .get(user_id.as_str())
            .cloned()
            .ok_or_else(|| IdentityError::NotFound {
                user_id: user_id.to_string(),
            })
    }

    async fn employee_by_id(&self, user_id: &UserId) -> Result<PartyName, IdentityError> {
        self.employees
            .read()
            .unwrap()
            .get(user_id.as_str())
            .cloned()
            .ok_or_else(|| IdentityError::NotFound {
                user_id: user_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn client_lookup() {
        let directory = StaticIdentityDirectory::new();
        directory.add_client(&UserId::new("user-1"), "Ada", "Lovelace");

        let name = directory.client_by_id(&UserId::new("user-1")).await.unwrap();
        assert_eq!(name.display(), "Ada Lovelace");
    }

    #[tokio::test]
    async fn employee_is_separate_from_client() {
        let directory = StaticIdentityDirectory::new();
        directory.add_employee(&UserId::new("emp-1"), "Grace", "Hopper");

        assert!(directory.client_by_id(&UserId::new("emp-1")).await.is_err());
        let name = directory
            .employee_by_id(&UserId::new("emp-1"))
            .await
            .unwrap();
        assert_eq!(name.display(), "Grace Hopper");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let directory = StaticIdentityDirectory::new();
        let result = directory.client_by_id(&UserId::new("ghost")).await;
        assert!(matches!(result, Err(IdentityError::NotFound { .. })));
    }
}
