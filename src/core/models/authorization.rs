use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    Pending,
    Approved,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAuthorization {
    pub authorization_id: String,
    pub group_id: String,
    pub user_id: String,
    pub status: AuthorizationStatus,
    pub limit: f64,
    pub token: String,
    #[schema(value_type = String, example = "2026-10-01T09:00:00Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, example = "2026-10-01T09:05:00Z")]
    pub approved_at: Option<DateTime<Utc>>,
}

impl PaymentAuthorization {
    pub fn is_approved(&self) -> bool {
        self.status == AuthorizationStatus::Approved
    }
}
