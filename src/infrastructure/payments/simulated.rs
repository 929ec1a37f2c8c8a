use crate::core::errors::RentSplitError;
use crate::infrastructure::payments::{ChargeReceipt, ChargeRequest, PaymentProcessor};
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

/// Used when no payment credentials are configured. Every charge succeeds.
#[derive(Clone, Default)]
pub struct SimulatedPaymentProcessor;

impl SimulatedPaymentProcessor {
    pub fn new() -> Self {
        SimulatedPaymentProcessor
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedPaymentProcessor {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, RentSplitError> {
        let tx_ref = format!("x402-sim-{}-{}", Utc::now().timestamp_millis(), request.member_id);
        debug!(group_id = %request.group_id, member_id = %request.member_id, amount = request.amount, "Simulated charge");
        Ok(ChargeReceipt { tx_ref, simulated: true })
    }
}
