pub mod in_memory;
pub mod webhook;

use crate::core::errors::RentSplitError;
use crate::core::models::channel::Delivery;
use async_trait::async_trait;
use serde_json::{Value, json};

pub const APP_NAME: &str = "RentSplit";

/// A text update for every recipient of a group conversation.
#[derive(Clone, Debug)]
pub struct Broadcast {
    pub group_id: String,
    pub group_name: String,
    pub recipients: Vec<String>,
    pub text: String,
    pub kind: Option<String>,
    pub actor: Option<String>,
    pub payload: Option<Value>,
}

impl Broadcast {
    pub fn conversation_id(&self) -> String {
        conversation_id(&self.group_id)
    }

    pub fn metadata(&self) -> Value {
        json!({
            "groupId": self.group_id,
            "groupName": self.group_name,
            "app": APP_NAME,
            "type": self.kind,
            "actor": self.actor,
            "payload": self.payload,
        })
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns the conversation id the group's messages are threaded under.
    async fn ensure_conversation(&self, group_id: &str, group_name: &str) -> Result<String, RentSplitError>;
    async fn broadcast(&self, message: &Broadcast) -> Result<Delivery, RentSplitError>;
    async fn send_invite(
        &self,
        group_id: &str,
        group_name: &str,
        wallet_address: &str,
        code: &str,
    ) -> Result<Delivery, RentSplitError>;
}

pub fn conversation_id(group_id: &str) -> String {
    format!("rentsplit-{}", group_id)
}

/// Lowercased, de-duplicated, blanks dropped. Keeps first-seen order.
pub fn unique_lowercase(addresses: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for address in addresses {
        let lower = address.trim().to_lowercase();
        if !lower.is_empty() && !unique.contains(&lower) {
            unique.push(lower);
        }
    }
    unique
}

pub fn invite_text(group_name: &str, code: &str) -> String {
    format!(
        "You've been invited to join the rent group \"{}\" on {}. Invite code: {}",
        group_name, APP_NAME, code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_lowercase_dedupes_and_drops_blanks() {
        let input = vec![
            "0xAA".to_string(),
            "".to_string(),
            "0xaa".to_string(),
            " 0xBB ".to_string(),
        ];
        assert_eq!(unique_lowercase(&input), vec!["0xaa".to_string(), "0xbb".to_string()]);
    }
}
