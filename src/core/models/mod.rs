pub mod activity;
pub mod authorization;
pub mod channel;
pub mod group;
pub mod invite;
pub mod retry;
pub mod settlement;
pub mod user;

use serde::{Deserialize, Serialize};

/// Composite key for anything stored per (group, user) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberKey {
    pub group_id: String,
    pub user_id: String,
}

impl MemberKey {
    pub fn new(group_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        MemberKey {
            group_id: group_id.into(),
            user_id: user_id.into(),
        }
    }
}

impl std::fmt::Display for MemberKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.group_id, self.user_id)
    }
}
