pub mod http;
pub mod simulated;

use crate::core::errors::RentSplitError;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct ChargeRequest {
    pub group_id: String,
    pub member_id: String,
    pub authorization_id: String,
    pub amount: f64,
    pub token: String,
}

impl ChargeRequest {
    /// Idempotency reference sent along with the charge.
    pub fn reference(&self, at_millis: i64) -> String {
        format!("rent-{}-{}-{}", self.group_id, self.member_id, at_millis)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChargeReceipt {
    pub tx_ref: String,
    pub simulated: bool,
}

/// Executes a charge against an approved authorization. An `Err` means the
/// member was not charged; its message becomes the failure reason.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, RentSplitError>;
}
