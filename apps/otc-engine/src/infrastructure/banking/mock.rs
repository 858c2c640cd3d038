//! Mock banking gateway.
//!
//! Accepts payments synchronously and records them; settlement
//! callbacks are driven by the caller (tests, demo binary) through the
//! saga coordinator. Refusal behavior is switchable to exercise the
//! compensation paths.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use crate::application::ports::{
    AccountKind, BankingError, BankingPort, PaymentInstruction, SettlementAccount,
};
use crate::domain::shared::{GatewayRef, UserId};

/// Mock implementation of `BankingPort`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct MockBankingGateway {
    accounts: RwLock<Vec<SettlementAccount>>,
    executed: RwLock<Vec<PaymentInstruction>>,
    rejected: RwLock<Vec<GatewayRef>>,
    refuse_payments: AtomicBool,
    refuse_rejections: AtomicBool,
    next_ref: AtomicU64,
}

impl MockBankingGateway {
    /// Create a gateway with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a settlement account for a user.
    pub fn register_account(&self, owner_id: UserId, account_number: &str, kind: AccountKind) {
        self.accounts.write().unwrap().push(SettlementAccount {
            owner_id,
            account_number: account_number.to_string(),
            kind,
        });
    }

    /// Make `execute_system_payment` refuse all payments.
    pub fn refuse_payments(&self, refuse: bool) {
        self.refuse_payments.store(refuse, Ordering::SeqCst);
    }

    /// Make `reject_payment` fail.
    pub fn refuse_rejections(&self, refuse: bool) {
        self.refuse_rejections.store(refuse, Ordering::SeqCst);
    }

    /// All accepted payment instructions, in dispatch order.
    #[must_use]
    pub fn executed(&self) -> Vec<PaymentInstruction> {
        self.executed.read().unwrap().clone()
    }

    /// All rollback requests received.
    #[must_use]
    pub fn rejections(&self) -> Vec<GatewayRef> {
        self.rejected.read().unwrap().clone()
    }
}

#[async_trait]
impl BankingPort for MockBankingGateway {
    async fn settlement_account(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SettlementAccount>, BankingError> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts.iter().find(|a| &a.owner_id == user_id).cloned())
    }

    async fn execute_system_payment(
        &self,
        instruction: PaymentInstruction,
    ) -> Result<GatewayRef, BankingError> {
        if self.refuse_payments.load(Ordering::SeqCst) {
            return Err(BankingError::PaymentRefused {
                reason: "refused by mock configuration".to_string(),
            });
        }

        let n = self.next_ref.fetch_add(1, Ordering::SeqCst);
        self.executed.write().unwrap().push(instruction);
        Ok(GatewayRef::new(format!("mock-gw-{n}")))
    }

    async fn reject_payment(&self, reference: &GatewayRef) -> Result<(), BankingError> {
        if self.refuse_rejections.load(Ordering::SeqCst) {
            return Err(BankingError::RejectionRefused {
                reference: reference.to_string(),
                reason: "refused by mock configuration".to_string(),
            });
        }
        self.rejected.write().unwrap().push(reference.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Money;

    fn account(user: &str) -> SettlementAccount {
        SettlementAccount {
            owner_id: UserId::new(user),
            account_number: format!("acct-{user}"),
            kind: AccountKind::Personal,
        }
    }

    fn instruction() -> PaymentInstruction {
        PaymentInstruction {
            sender: account("buyer-1"),
            receiver: account("seller-1"),
            amount: Money::from_units(100),
            code: "289".to_string(),
            purpose: "test".to_string(),
            reference: "pay-1".to_string(),
            client_id: UserId::new("buyer-1"),
        }
    }

    #[tokio::test]
    async fn account_lookup() {
        let gateway = MockBankingGateway::new();
        gateway.register_account(UserId::new("seller-1"), "acct-1", AccountKind::Personal);

        let found = gateway
            .settlement_account(&UserId::new("seller-1"))
            .await
            .unwrap();
        assert!(found.is_some());

        let missing = gateway
            .settlement_account(&UserId::new("nobody"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn payments_record_and_get_unique_refs() {
        let gateway = MockBankingGateway::new();

        let a = gateway.execute_system_payment(instruction()).await.unwrap();
        let b = gateway.execute_system_payment(instruction()).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(gateway.executed().len(), 2);
    }

    #[tokio::test]
    async fn refusal_mode_blocks_payments() {
        let gateway = MockBankingGateway::new();
        gateway.refuse_payments(true);

        let result = gateway.execute_system_payment(instruction()).await;
        assert!(matches!(result, Err(BankingError::PaymentRefused { .. })));
        assert!(gateway.executed().is_empty());
    }

    #[tokio::test]
    async fn rejections_are_recorded_or_refused() {
        let gateway = MockBankingGateway::new();
        let reference = GatewayRef::new("mock-gw-0");

        gateway.reject_payment(&reference).await.unwrap();
        assert_eq!(gateway.rejections(), vec![reference.clone()]);

        gateway.refuse_rejections(true);
        let result = gateway.reject_payment(&reference).await;
        assert!(matches!(result, Err(BankingError::RejectionRefused { .. })));
    }
}
