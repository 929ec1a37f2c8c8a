use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-recipient failure reported by the notifier. `address` is absent when
/// the whole broadcast failed.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFailure {
    pub address: Option<String>,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub conversation_id: Option<String>,
    pub sent: Vec<String>,
    pub failed: Vec<DeliveryFailure>,
    pub unreachable: Vec<String>,
}

impl Delivery {
    /// Result recorded when the notifier could not be reached at all.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Delivery {
            conversation_id: None,
            sent: Vec::new(),
            failed: vec![DeliveryFailure {
                address: None,
                reason: reason.into(),
            }],
            unreachable: Vec::new(),
        }
    }

    pub fn delivered_any(&self) -> bool {
        !self.sent.is_empty()
    }
}

/// Last known state of a group's messaging conversation.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatus {
    pub group_id: String,
    pub conversation_id: Option<String>,
    pub members: Vec<String>,
    #[schema(value_type = Option<String>, example = "2026-10-01T09:00:00Z")]
    pub last_sent_at: Option<DateTime<Utc>>,
    pub last_message: Option<String>,
    pub last_failed: Vec<DeliveryFailure>,
    pub last_unreachable: Vec<String>,
}

impl ChannelStatus {
    pub fn empty(group_id: &str) -> Self {
        ChannelStatus {
            group_id: group_id.to_string(),
            conversation_id: None,
            members: Vec::new(),
            last_sent_at: None,
            last_message: None,
            last_failed: Vec::new(),
            last_unreachable: Vec::new(),
        }
    }

    /// Folds a broadcast result into the previous status.
    pub fn after_broadcast(
        previous: Option<ChannelStatus>,
        group_id: &str,
        text: &str,
        delivery: &Delivery,
        now: DateTime<Utc>,
    ) -> Self {
        let previous = previous.unwrap_or_else(|| ChannelStatus::empty(group_id));
        ChannelStatus {
            group_id: group_id.to_string(),
            conversation_id: delivery.conversation_id.clone().or(previous.conversation_id),
            members: delivery.sent.clone(),
            last_sent_at: if delivery.delivered_any() {
                Some(now)
            } else {
                previous.last_sent_at
            },
            last_message: Some(text.to_string()),
            last_failed: delivery.failed.clone(),
            last_unreachable: delivery.unreachable.clone(),
        }
    }
}
