use crate::core::errors::RentSplitError;
use crate::infrastructure::payments::{ChargeReceipt, ChargeRequest, PaymentProcessor};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::error;

/// Charges through the payment provider's REST API (`POST {base}/x402/charges`).
pub struct HttpPaymentProcessor {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    api_key: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChargeResponse {
    id: Option<String>,
    #[serde(rename = "txRef")]
    tx_ref: Option<String>,
    reference: Option<String>,
    error: Option<String>,
    message: Option<String>,
}

impl HttpPaymentProcessor {
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RentSplitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RentSplitError::PaymentError(format!("HTTP client: {}", e)))?;
        Ok(HttpPaymentProcessor {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl PaymentProcessor for HttpPaymentProcessor {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, RentSplitError> {
        let reference = request.reference(Utc::now().timestamp_millis());
        let payload = json!({
            "app_id": self.app_id,
            "authorization_id": request.authorization_id,
            "amount": { "value": request.amount, "currency": request.token },
            "reference": reference,
            "metadata": { "groupId": request.group_id, "memberId": request.member_id },
        });

        let response = self
            .client
            .post(format!("{}/x402/charges", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, member_id = %request.member_id, "Charge request failed");
                RentSplitError::PaymentError(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RentSplitError::PaymentError(e.to_string()))?;
        let body: ChargeResponse = if text.trim().is_empty() {
            ChargeResponse::default()
        } else {
            serde_json::from_str(&text).map_err(|_| {
                let snippet: String = text.chars().take(200).collect();
                RentSplitError::PaymentError(format!("non-JSON response ({}): {}", status.as_u16(), snippet))
            })?
        };

        if !status.is_success() {
            let reason = body
                .error
                .or(body.message)
                .unwrap_or_else(|| format!("status_{}", status.as_u16()));
            error!(%status, reason = %reason, member_id = %request.member_id, "Charge rejected");
            return Err(RentSplitError::PaymentError(reason));
        }

        let tx_ref = body.id.or(body.tx_ref).or(body.reference).unwrap_or(reference);
        Ok(ChargeReceipt { tx_ref, simulated: false })
    }
}
