use crate::core::errors::RentSplitError;
use crate::core::models::activity::ActivityEntry;
use crate::infrastructure::logging::{ACTIVITY_LOG_CAPACITY, ActivityEvent, ActivityLog};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct InMemoryActivityLog {
    logs: Arc<RwLock<HashMap<String, VecDeque<ActivityEntry>>>>,
    capacity: usize,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(ACTIVITY_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        InMemoryActivityLog {
            logs: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }
}

impl Default for InMemoryActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn append(&self, group_id: &str, event: ActivityEvent) -> Result<ActivityEntry, RentSplitError> {
        let entry = ActivityEntry {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            kind: event.kind,
            text: event.text,
            actor: event.actor,
            payload: event.payload,
            created_at: chrono::Utc::now(),
        };
        let mut logs = self.logs.write().await;
        let log = logs.entry(group_id.to_string()).or_default();
        log.push_front(entry.clone());
        log.truncate(self.capacity);
        Ok(entry)
    }

    async fn recent(&self, group_id: &str) -> Result<Vec<ActivityEntry>, RentSplitError> {
        let logs = self.logs.read().await;
        Ok(logs
            .get(group_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default())
    }
}
