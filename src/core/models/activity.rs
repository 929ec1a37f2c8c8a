use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    pub group_id: String,
    pub kind: String,
    pub text: String,
    pub actor: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
    #[schema(value_type = String, example = "2026-10-01T09:00:00Z")]
    pub created_at: DateTime<Utc>,
}
