use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_RENT_DUE_DAY: u32 = 1;
pub const MAX_RENT_DUE_DAY: u32 = 28;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Owner => "owner",
            Role::Member => "member",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub total_rent: f64,
    pub token: String,
    pub collector_address: String,
    pub owner_id: String,
    pub rent_due_day: u32,
    #[schema(value_type = String, example = "2026-10-01T09:00:00Z")]
    pub created_at: DateTime<Utc>,
    pub conversation_id: Option<String>,
}

impl Group {
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn role_of(&self, user_id: &str) -> Role {
        if self.is_owner(user_id) { Role::Owner } else { Role::Member }
    }

    /// Equal split of the rent. `None` for an empty group.
    pub fn share_for(&self, member_count: usize) -> Option<f64> {
        if member_count == 0 {
            None
        } else {
            Some(self.total_rent / member_count as f64)
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub group_id: String,
    pub user_id: String,
    #[schema(value_type = String, example = "2026-10-01T09:00:00Z")]
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub user_id: String,
    pub email: Option<String>,
    pub wallet_address: Option<String>,
    pub role: Role,
    pub has_autopay: bool,
}
