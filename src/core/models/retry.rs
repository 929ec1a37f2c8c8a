use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::MemberKey;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrySchedule {
    pub group_id: String,
    pub user_id: String,
    #[schema(value_type = String, example = "2026-10-02T09:00:00Z")]
    pub next_run: DateTime<Utc>,
    pub attempts: u32,
    pub last_reason: String,
}

impl RetrySchedule {
    pub fn key(&self) -> MemberKey {
        MemberKey::new(&self.group_id, &self.user_id)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_run <= now
    }
}
