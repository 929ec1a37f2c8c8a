use crate::core::errors::RentSplitError;
use crate::core::models::{
    MemberKey,
    authorization::{AuthorizationStatus, PaymentAuthorization},
    channel::ChannelStatus,
    group::{Group, GroupMember},
    invite::{Invite, InviteStatus},
    retry::RetrySchedule,
    settlement::SettlementRecord,
    user::User,
};
use crate::infrastructure::storage::{Storage, UserLogin};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    groups: Arc<RwLock<HashMap<String, Group>>>,
    members: Arc<RwLock<HashMap<String, Vec<GroupMember>>>>,
    invites: Arc<RwLock<HashMap<String, Invite>>>,
    authorizations: Arc<RwLock<HashMap<MemberKey, PaymentAuthorization>>>,
    settlements: Arc<RwLock<HashMap<String, Vec<SettlementRecord>>>>,
    retries: Arc<RwLock<HashMap<MemberKey, RetrySchedule>>>,
    channels: Arc<RwLock<HashMap<String, ChannelStatus>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn wallet_matches(user: &User, wallet_lower: &str) -> bool {
    user.wallet_address
        .as_deref()
        .is_some_and(|w| w.to_lowercase() == wallet_lower)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn upsert_user(&self, login: UserLogin) -> Result<User, RentSplitError> {
        let mut users = self.users.write().await;
        let email = non_empty(login.email);
        let wallet_address = non_empty(login.wallet_address);
        let user = users
            .entry(login.user_id.clone())
            .and_modify(|existing| {
                if email.is_some() {
                    existing.email = email.clone();
                }
                if wallet_address.is_some() {
                    existing.wallet_address = wallet_address.clone();
                }
            })
            .or_insert_with(|| User {
                id: login.user_id.clone(),
                email: email.clone(),
                wallet_address: wallet_address.clone(),
                created_at: Utc::now(),
            });
        Ok(user.clone())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, RentSplitError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn find_or_create_wallet_user(&self, wallet_address: &str) -> Result<User, RentSplitError> {
        let wallet_lower = wallet_address.to_lowercase();
        // Held for the whole lookup so two callers cannot both create the user.
        let mut users = self.users.write().await;
        if let Some(user) = users.values().find(|u| wallet_matches(u, &wallet_lower)) {
            return Ok(user.clone());
        }
        let user = User::from_wallet(wallet_address);
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn save_group(&self, group: Group) -> Result<(), RentSplitError> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, RentSplitError> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, RentSplitError> {
        let groups = self.groups.read().await;
        let mut list: Vec<Group> = groups.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn get_user_groups(&self, user_id: &str) -> Result<Vec<Group>, RentSplitError> {
        let member_group_ids: Vec<String> = {
            let members = self.members.read().await;
            members
                .iter()
                .filter(|(_, list)| list.iter().any(|m| m.user_id == user_id))
                .map(|(group_id, _)| group_id.clone())
                .collect()
        };
        Ok(self
            .list_groups()
            .await?
            .into_iter()
            .filter(|g| member_group_ids.contains(&g.id))
            .collect())
    }

    async fn add_member(&self, key: &MemberKey, joined_at: DateTime<Utc>) -> Result<bool, RentSplitError> {
        let mut members = self.members.write().await;
        let list = members.entry(key.group_id.clone()).or_default();
        if list.iter().any(|m| m.user_id == key.user_id) {
            return Ok(false);
        }
        list.push(GroupMember {
            group_id: key.group_id.clone(),
            user_id: key.user_id.clone(),
            joined_at,
        });
        Ok(true)
    }

    async fn remove_member(&self, key: &MemberKey) -> Result<bool, RentSplitError> {
        let mut members = self.members.write().await;
        let Some(list) = members.get_mut(&key.group_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|m| m.user_id != key.user_id);
        Ok(list.len() != before)
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<GroupMember>, RentSplitError> {
        let members = self.members.read().await;
        Ok(members.get(group_id).cloned().unwrap_or_default())
    }

    async fn is_group_member(&self, key: &MemberKey) -> Result<bool, RentSplitError> {
        let members = self.members.read().await;
        Ok(members
            .get(&key.group_id)
            .map(|list| list.iter().any(|m| m.user_id == key.user_id))
            .unwrap_or(false))
    }

    async fn save_invite(&self, invite: Invite) -> Result<(), RentSplitError> {
        let mut invites = self.invites.write().await;
        invites.insert(invite.code.clone(), invite);
        Ok(())
    }

    async fn get_invite(&self, code: &str) -> Result<Option<Invite>, RentSplitError> {
        let invites = self.invites.read().await;
        Ok(invites.get(code).cloned())
    }

    async fn accept_invite(
        &self,
        code: &str,
        accepted_by: &str,
        accepted_at: DateTime<Utc>,
    ) -> Result<Invite, RentSplitError> {
        let mut invites = self.invites.write().await;
        let invite = invites
            .get_mut(code)
            .ok_or_else(|| RentSplitError::InviteNotFound(code.to_string()))?;
        if invite.status != InviteStatus::Pending {
            return Err(RentSplitError::InviteNotPending(code.to_string()));
        }
        invite.status = InviteStatus::Accepted;
        invite.accepted_by = Some(accepted_by.to_string());
        invite.accepted_at = Some(accepted_at);
        Ok(invite.clone())
    }

    async fn save_authorization(&self, authorization: PaymentAuthorization) -> Result<(), RentSplitError> {
        let mut authorizations = self.authorizations.write().await;
        let key = MemberKey::new(&authorization.group_id, &authorization.user_id);
        authorizations.insert(key, authorization);
        Ok(())
    }

    async fn get_authorization(&self, key: &MemberKey) -> Result<Option<PaymentAuthorization>, RentSplitError> {
        let authorizations = self.authorizations.read().await;
        Ok(authorizations.get(key).cloned())
    }

    async fn approve_authorization(
        &self,
        key: &MemberKey,
        approved_at: DateTime<Utc>,
    ) -> Result<PaymentAuthorization, RentSplitError> {
        let mut authorizations = self.authorizations.write().await;
        let authorization = authorizations
            .get_mut(key)
            .ok_or_else(|| RentSplitError::AuthorizationNotFound(key.user_id.clone()))?;
        if authorization.status == AuthorizationStatus::Pending {
            authorization.status = AuthorizationStatus::Approved;
            authorization.approved_at = Some(approved_at);
        }
        Ok(authorization.clone())
    }

    async fn delete_authorization(&self, key: &MemberKey) -> Result<bool, RentSplitError> {
        let mut authorizations = self.authorizations.write().await;
        Ok(authorizations.remove(key).is_some())
    }

    async fn append_settlement(&self, record: SettlementRecord) -> Result<(), RentSplitError> {
        let mut settlements = self.settlements.write().await;
        settlements.entry(record.group_id.clone()).or_default().push(record);
        Ok(())
    }

    async fn get_settlements(&self, group_id: &str) -> Result<Vec<SettlementRecord>, RentSplitError> {
        let settlements = self.settlements.read().await;
        Ok(settlements.get(group_id).cloned().unwrap_or_default())
    }

    async fn schedule_retry(
        &self,
        key: &MemberKey,
        next_run: DateTime<Utc>,
        reason: &str,
    ) -> Result<RetrySchedule, RentSplitError> {
        let mut retries = self.retries.write().await;
        let attempts = retries.get(key).map(|r| r.attempts).unwrap_or(0) + 1;
        let retry = RetrySchedule {
            group_id: key.group_id.clone(),
            user_id: key.user_id.clone(),
            next_run,
            attempts,
            last_reason: reason.to_string(),
        };
        retries.insert(key.clone(), retry.clone());
        Ok(retry)
    }

    async fn get_retry(&self, key: &MemberKey) -> Result<Option<RetrySchedule>, RentSplitError> {
        let retries = self.retries.read().await;
        Ok(retries.get(key).cloned())
    }

    async fn due_retries(&self, now: DateTime<Utc>) -> Result<Vec<RetrySchedule>, RentSplitError> {
        let retries = self.retries.read().await;
        let mut due: Vec<RetrySchedule> = retries.values().filter(|r| r.is_due(now)).cloned().collect();
        due.sort_by(|a, b| a.next_run.cmp(&b.next_run).then_with(|| a.key().cmp(&b.key())));
        Ok(due)
    }

    async fn clear_retry(&self, key: &MemberKey) -> Result<bool, RentSplitError> {
        let mut retries = self.retries.write().await;
        Ok(retries.remove(key).is_some())
    }

    async fn save_channel_status(&self, status: ChannelStatus) -> Result<(), RentSplitError> {
        let mut channels = self.channels.write().await;
        channels.insert(status.group_id.clone(), status);
        Ok(())
    }

    async fn get_channel_status(&self, group_id: &str) -> Result<Option<ChannelStatus>, RentSplitError> {
        let channels = self.channels.read().await;
        Ok(channels.get(group_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accept_invite_flips_only_once() {
        let storage = InMemoryStorage::new();
        storage
            .save_invite(Invite {
                code: "inv_abc123".to_string(),
                group_id: "g1".to_string(),
                kind: crate::core::models::invite::InviteKind::Code,
                status: InviteStatus::Pending,
                created_by: Some("u1".to_string()),
                wallet_address: None,
                created_at: Utc::now(),
                accepted_by: None,
                accepted_at: None,
            })
            .await
            .unwrap();

        let accepted = storage.accept_invite("inv_abc123", "u2", Utc::now()).await.unwrap();
        assert_eq!(accepted.status, InviteStatus::Accepted);
        assert_eq!(accepted.accepted_by.as_deref(), Some("u2"));

        let second = storage.accept_invite("inv_abc123", "u3", Utc::now()).await;
        assert!(matches!(second, Err(RentSplitError::InviteNotPending(_))));
        let missing = storage.accept_invite("nope", "u3", Utc::now()).await;
        assert!(matches!(missing, Err(RentSplitError::InviteNotFound(_))));
    }

    #[tokio::test]
    async fn schedule_retry_increments_a_single_entry() {
        let storage = InMemoryStorage::new();
        let key = MemberKey::new("g1", "u1");
        let now = Utc::now();
        storage.schedule_retry(&key, now, "charge_failed").await.unwrap();
        let retry = storage.schedule_retry(&key, now, "insufficient_funds").await.unwrap();
        assert_eq!(retry.attempts, 2);
        assert_eq!(retry.last_reason, "insufficient_funds");
        assert_eq!(storage.due_retries(now).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn wallet_users_are_matched_case_insensitively() {
        let storage = InMemoryStorage::new();
        let first = storage
            .find_or_create_wallet_user("0xAbC0000000000000000000000000000000000001")
            .await
            .unwrap();
        let second = storage
            .find_or_create_wallet_user("0xabc0000000000000000000000000000000000001")
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.id, "wallet_0xabc0000000000000000000000000000000000001");
    }

    #[tokio::test]
    async fn upsert_keeps_existing_fields_when_absent() {
        let storage = InMemoryStorage::new();
        storage
            .upsert_user(UserLogin {
                user_id: "u1".to_string(),
                email: Some("a@b.io".to_string()),
                wallet_address: None,
            })
            .await
            .unwrap();
        let user = storage
            .upsert_user(UserLogin {
                user_id: "u1".to_string(),
                email: None,
                wallet_address: Some("0x01".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(user.email.as_deref(), Some("a@b.io"));
        assert_eq!(user.wallet_address.as_deref(), Some("0x01"));
    }
}
