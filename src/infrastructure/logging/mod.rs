pub mod in_memory;

use crate::core::errors::RentSplitError;
use crate::core::models::activity::ActivityEntry;
use async_trait::async_trait;

/// Newest entries kept per group.
pub const ACTIVITY_LOG_CAPACITY: usize = 200;

/// What happened in a group, for the group's activity feed.
#[derive(Clone, Debug, Default)]
pub struct ActivityEvent {
    pub kind: String,
    pub text: String,
    pub actor: Option<String>,
    pub payload: Option<serde_json::Value>,
}

impl ActivityEvent {
    pub fn new(kind: &str, text: impl Into<String>) -> Self {
        ActivityEvent {
            kind: kind.to_string(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn append(&self, group_id: &str, event: ActivityEvent) -> Result<ActivityEntry, RentSplitError>;
    /// Newest first.
    async fn recent(&self, group_id: &str) -> Result<Vec<ActivityEntry>, RentSplitError>;
}
