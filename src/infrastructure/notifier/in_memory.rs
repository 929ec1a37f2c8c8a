use crate::core::errors::RentSplitError;
use crate::core::models::channel::{Delivery, DeliveryFailure};
use crate::core::wallet::is_wallet_address;
use crate::infrastructure::notifier::{Broadcast, Notifier, conversation_id, invite_text, unique_lowercase};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Clone, Debug)]
pub struct SentMessage {
    pub conversation_id: String,
    pub recipients: Vec<String>,
    pub text: String,
    pub kind: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Keeps every message in an outbox instead of talking to a messaging
/// network. Only well-formed wallet addresses count as reachable.
#[derive(Clone, Default)]
pub struct InMemoryNotifier {
    outbox: Arc<RwLock<Vec<SentMessage>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<SentMessage> {
        self.outbox.read().await.clone()
    }

    async fn deliver(&self, conversation: String, addresses: &[String], text: &str, kind: Option<String>) -> Delivery {
        let addresses = unique_lowercase(addresses);
        if addresses.is_empty() {
            return Delivery {
                conversation_id: None,
                sent: Vec::new(),
                failed: vec![DeliveryFailure {
                    address: None,
                    reason: "no_addresses".to_string(),
                }],
                unreachable: Vec::new(),
            };
        }
        let (reachable, unreachable): (Vec<String>, Vec<String>) =
            addresses.into_iter().partition(|a| is_wallet_address(a));
        if !reachable.is_empty() {
            info!(conversation = %conversation, recipients = reachable.len(), "Message queued");
            self.outbox.write().await.push(SentMessage {
                conversation_id: conversation.clone(),
                recipients: reachable.clone(),
                text: text.to_string(),
                kind,
                sent_at: Utc::now(),
            });
        }
        Delivery {
            conversation_id: Some(conversation),
            sent: reachable,
            failed: Vec::new(),
            unreachable,
        }
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn ensure_conversation(&self, group_id: &str, _group_name: &str) -> Result<String, RentSplitError> {
        Ok(conversation_id(group_id))
    }

    async fn broadcast(&self, message: &Broadcast) -> Result<Delivery, RentSplitError> {
        Ok(self
            .deliver(message.conversation_id(), &message.recipients, &message.text, message.kind.clone())
            .await)
    }

    async fn send_invite(
        &self,
        group_id: &str,
        group_name: &str,
        wallet_address: &str,
        code: &str,
    ) -> Result<Delivery, RentSplitError> {
        Ok(self
            .deliver(
                conversation_id(group_id),
                &[wallet_address.to_string()],
                &invite_text(group_name, code),
                Some("invite".to_string()),
            )
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x00000000000000000000000000000000000000A1";

    fn broadcast(recipients: Vec<String>) -> Broadcast {
        Broadcast {
            group_id: "g1".to_string(),
            group_name: "Flat".to_string(),
            recipients,
            text: "hello".to_string(),
            kind: None,
            actor: None,
            payload: None,
        }
    }

    #[tokio::test]
    async fn splits_reachable_and_unreachable_recipients() {
        let notifier = InMemoryNotifier::new();
        let delivery = notifier
            .broadcast(&broadcast(vec![ALICE.to_string(), "0xabc".to_string(), ALICE.to_lowercase()]))
            .await
            .unwrap();
        assert_eq!(delivery.sent, vec![ALICE.to_lowercase()]);
        assert_eq!(delivery.unreachable, vec!["0xabc".to_string()]);
        assert_eq!(delivery.conversation_id.as_deref(), Some("rentsplit-g1"));
        assert_eq!(notifier.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_recipient_list_is_reported_as_failure() {
        let notifier = InMemoryNotifier::new();
        let delivery = notifier.broadcast(&broadcast(vec![])).await.unwrap();
        assert!(delivery.sent.is_empty());
        assert_eq!(delivery.failed[0].reason, "no_addresses");
        assert!(notifier.messages().await.is_empty());
    }
}
