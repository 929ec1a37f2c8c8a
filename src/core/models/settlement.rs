use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Failed,
    Skipped,
}

/// Outcome of charging one member during a settlement.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub user_id: String,
    pub from: Option<String>,
    pub amount: f64,
    pub method: String,
    pub tx_ref: Option<String>,
    pub status: PaymentStatus,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    pub id: String,
    pub group_id: String,
    pub content_ref: Option<String>,
    pub total: f64,
    pub token: String,
    #[schema(value_type = String, example = "2026-10-01T09:00:00Z")]
    pub created_at: DateTime<Utc>,
}
