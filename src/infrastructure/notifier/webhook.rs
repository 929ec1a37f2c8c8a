use crate::core::errors::RentSplitError;
use crate::core::models::channel::{Delivery, DeliveryFailure};
use crate::infrastructure::notifier::{Broadcast, Notifier, conversation_id, invite_text, unique_lowercase};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Hands broadcasts to a messaging relay over HTTP. The relay answers with
/// the per-recipient outcome.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    conversation_id: String,
    recipients: Vec<String>,
    text: &'a str,
    metadata: Value,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RelayResponse {
    sent: Vec<String>,
    failed: Vec<DeliveryFailure>,
    unreachable: Vec<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RentSplitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RentSplitError::NotifierUnavailable(format!("HTTP client: {}", e)))?;
        Ok(WebhookNotifier {
            client,
            url: url.into(),
        })
    }

    async fn post(&self, message: &Broadcast) -> Result<Delivery, RentSplitError> {
        let recipients = unique_lowercase(&message.recipients);
        let conversation = message.conversation_id();
        let request = RelayRequest {
            conversation_id: conversation.clone(),
            recipients,
            text: &message.text,
            metadata: message.metadata(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RentSplitError::NotifierUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, url = %self.url, "Messaging relay rejected broadcast");
            return Err(RentSplitError::NotifierUnavailable(format!("status_{}", status.as_u16())));
        }
        let body: RelayResponse = response
            .json()
            .await
            .map_err(|e| RentSplitError::NotifierUnavailable(format!("Invalid relay response: {}", e)))?;
        Ok(Delivery {
            conversation_id: Some(conversation),
            sent: body.sent,
            failed: body.failed,
            unreachable: body.unreachable,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn ensure_conversation(&self, group_id: &str, _group_name: &str) -> Result<String, RentSplitError> {
        Ok(conversation_id(group_id))
    }

    async fn broadcast(&self, message: &Broadcast) -> Result<Delivery, RentSplitError> {
        self.post(message).await
    }

    async fn send_invite(
        &self,
        group_id: &str,
        group_name: &str,
        wallet_address: &str,
        code: &str,
    ) -> Result<Delivery, RentSplitError> {
        self.post(&Broadcast {
            group_id: group_id.to_string(),
            group_name: group_name.to_string(),
            recipients: vec![wallet_address.to_string()],
            text: invite_text(group_name, code),
            kind: Some("invite".to_string()),
            actor: None,
            payload: Some(serde_json::json!({ "code": code })),
        })
        .await
    }
}
