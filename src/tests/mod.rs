mod group_tests;
mod payment_tests;

use crate::core::errors::RentSplitError;
use crate::core::models::{channel::Delivery, group::Group, user::User};
use crate::core::services::{Collaborators, NewGroup, RentSplitService, ServiceSettings};
use crate::infrastructure::chain::ChainRpc;
use crate::infrastructure::content::{ContentStore, ContentStoreStatus, in_memory::InMemoryContentStore};
use crate::infrastructure::logging::in_memory::InMemoryActivityLog;
use crate::infrastructure::notifier::{Broadcast, Notifier, in_memory::InMemoryNotifier};
use crate::infrastructure::payments::{
    ChargeReceipt, ChargeRequest, PaymentProcessor, simulated::SimulatedPaymentProcessor,
};
use crate::infrastructure::storage::{UserLogin, in_memory::InMemoryStorage};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub type TestService = RentSplitService<InMemoryStorage, InMemoryActivityLog>;

pub const WALLET_A: &str = "0x1111111111111111111111111111111111111111";
pub const WALLET_B: &str = "0x2222222222222222222222222222222222222222";
pub const WALLET_C: &str = "0x3333333333333333333333333333333333333333";
pub const COLLECTOR: &str = "0x9999999999999999999999999999999999999999";
pub const APPROVAL_URL: &str = "https://approve.test/x402";

pub struct TestContext {
    pub service: Arc<TestService>,
    pub notifier: Arc<InMemoryNotifier>,
    pub content: Arc<InMemoryContentStore>,
}

pub fn create_test_context() -> TestContext {
    create_test_context_with(|_| {})
}

/// Builds a service over in-memory collaborators; `customize` may swap any of them.
pub fn create_test_context_with(customize: impl FnOnce(&mut Collaborators)) -> TestContext {
    let notifier = Arc::new(InMemoryNotifier::new());
    let content = Arc::new(InMemoryContentStore::new("testnet", true));
    let mut collaborators = Collaborators {
        notifier: notifier.clone(),
        payments: Arc::new(SimulatedPaymentProcessor::new()),
        content: content.clone(),
        chain: Arc::new(FixedBalanceChain(Some("1.5".to_string()))),
    };
    customize(&mut collaborators);
    let settings = ServiceSettings {
        approval_url: APPROVAL_URL.to_string(),
        ..ServiceSettings::default()
    };
    let service = RentSplitService::new(
        InMemoryStorage::new(),
        InMemoryActivityLog::new(),
        collaborators,
        settings,
    );
    TestContext {
        service: Arc::new(service),
        notifier,
        content,
    }
}

pub async fn login(service: &TestService, user_id: &str, wallet: Option<&str>) -> User {
    service
        .login(UserLogin {
            user_id: user_id.to_string(),
            email: Some(format!("{}@example.com", user_id)),
            wallet_address: wallet.map(String::from),
        })
        .await
        .unwrap()
}

pub fn flat(owner_id: &str, total_rent: f64) -> NewGroup {
    NewGroup {
        owner_id: owner_id.to_string(),
        name: "Flat 401".to_string(),
        total_rent,
        token: "USDC".to_string(),
        collector_address: COLLECTOR.to_string(),
        rent_due_day: None,
    }
}

pub async fn create_flat(service: &TestService, owner_id: &str) -> Group {
    service.create_group(flat(owner_id, 1000.0)).await.unwrap()
}

/// Declines every charge.
pub struct DecliningPaymentProcessor;

#[async_trait]
impl PaymentProcessor for DecliningPaymentProcessor {
    async fn charge(&self, _request: &ChargeRequest) -> Result<ChargeReceipt, RentSplitError> {
        Err(RentSplitError::PaymentError("insufficient_funds".to_string()))
    }
}

/// Declines the first `n` charges, then succeeds.
pub struct FlakyPaymentProcessor {
    failures_left: AtomicUsize,
}

impl FlakyPaymentProcessor {
    pub fn failing(n: usize) -> Self {
        FlakyPaymentProcessor {
            failures_left: AtomicUsize::new(n),
        }
    }
}

#[async_trait]
impl PaymentProcessor for FlakyPaymentProcessor {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, RentSplitError> {
        let declined = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if declined {
            return Err(RentSplitError::PaymentError("card_declined".to_string()));
        }
        Ok(ChargeReceipt {
            tx_ref: format!("tx-{}", request.member_id),
            simulated: true,
        })
    }
}

/// Messaging network that is always down.
pub struct UnreachableNotifier;

#[async_trait]
impl Notifier for UnreachableNotifier {
    async fn ensure_conversation(&self, _group_id: &str, _group_name: &str) -> Result<String, RentSplitError> {
        Err(RentSplitError::NotifierUnavailable("connection refused".to_string()))
    }

    async fn broadcast(&self, _message: &Broadcast) -> Result<Delivery, RentSplitError> {
        Err(RentSplitError::NotifierUnavailable("connection refused".to_string()))
    }

    async fn send_invite(
        &self,
        _group_id: &str,
        _group_name: &str,
        _wallet_address: &str,
        _code: &str,
    ) -> Result<Delivery, RentSplitError> {
        Err(RentSplitError::NotifierUnavailable("connection refused".to_string()))
    }
}

pub struct BrokenContentStore;

#[async_trait]
impl ContentStore for BrokenContentStore {
    async fn upload(&self, _document: &serde_json::Value) -> Result<String, RentSplitError> {
        Err(RentSplitError::ContentStoreError("gateway timeout".to_string()))
    }

    async fn status(&self) -> Result<ContentStoreStatus, RentSplitError> {
        Ok(ContentStoreStatus {
            enabled: false,
            network: "testnet".to_string(),
            records: Vec::new(),
        })
    }
}

/// Returns the configured balance, or an RPC error when `None`.
pub struct FixedBalanceChain(pub Option<String>);

#[async_trait]
impl ChainRpc for FixedBalanceChain {
    async fn get_balance(&self, _address: &str) -> Result<String, RentSplitError> {
        self.0
            .clone()
            .ok_or_else(|| RentSplitError::ChainRpcError("node unavailable".to_string()))
    }
}
