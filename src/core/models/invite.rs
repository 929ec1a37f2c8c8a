use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InviteKind {
    /// Shareable code handed out by a member.
    Code,
    /// Sent to a specific wallet through the notifier.
    Wallet,
}

impl InviteKind {
    pub fn code_prefix(&self) -> &'static str {
        match self {
            InviteKind::Code => "inv_",
            InviteKind::Wallet => "winv_",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub code: String,
    pub group_id: String,
    pub kind: InviteKind,
    pub status: InviteStatus,
    pub created_by: Option<String>,
    pub wallet_address: Option<String>,
    #[schema(value_type = String, example = "2026-10-01T09:00:00Z")]
    pub created_at: DateTime<Utc>,
    pub accepted_by: Option<String>,
    #[schema(value_type = Option<String>, example = "2026-10-02T09:00:00Z")]
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invite {
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }
}
