use crate::core::errors::RentSplitError;
use crate::core::models::{
    MemberKey,
    authorization::PaymentAuthorization,
    channel::ChannelStatus,
    group::{Group, GroupMember},
    invite::Invite,
    retry::RetrySchedule,
    settlement::SettlementRecord,
    user::User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Fields supplied by a login. Absent values keep what is already stored.
#[derive(Clone, Debug)]
pub struct UserLogin {
    pub user_id: String,
    pub email: Option<String>,
    pub wallet_address: Option<String>,
}

/// Persistence boundary. Every read-modify-write the service relies on is a
/// single call here, so an implementation can make it atomic.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn upsert_user(&self, login: UserLogin) -> Result<User, RentSplitError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, RentSplitError>;
    /// Returns the user owning `wallet_address`, creating a wallet-only user if none does.
    async fn find_or_create_wallet_user(&self, wallet_address: &str) -> Result<User, RentSplitError>;

    async fn save_group(&self, group: Group) -> Result<(), RentSplitError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, RentSplitError>;
    async fn list_groups(&self) -> Result<Vec<Group>, RentSplitError>;
    async fn get_user_groups(&self, user_id: &str) -> Result<Vec<Group>, RentSplitError>;

    /// Adds the membership. `false` when the user was already a member.
    async fn add_member(&self, key: &MemberKey, joined_at: DateTime<Utc>) -> Result<bool, RentSplitError>;
    async fn remove_member(&self, key: &MemberKey) -> Result<bool, RentSplitError>;
    async fn list_members(&self, group_id: &str) -> Result<Vec<GroupMember>, RentSplitError>;
    async fn is_group_member(&self, key: &MemberKey) -> Result<bool, RentSplitError>;

    async fn save_invite(&self, invite: Invite) -> Result<(), RentSplitError>;
    async fn get_invite(&self, code: &str) -> Result<Option<Invite>, RentSplitError>;
    /// Conditional pending -> accepted flip.
    async fn accept_invite(
        &self,
        code: &str,
        accepted_by: &str,
        accepted_at: DateTime<Utc>,
    ) -> Result<Invite, RentSplitError>;

    async fn save_authorization(&self, authorization: PaymentAuthorization) -> Result<(), RentSplitError>;
    async fn get_authorization(&self, key: &MemberKey) -> Result<Option<PaymentAuthorization>, RentSplitError>;
    async fn approve_authorization(
        &self,
        key: &MemberKey,
        approved_at: DateTime<Utc>,
    ) -> Result<PaymentAuthorization, RentSplitError>;
    async fn delete_authorization(&self, key: &MemberKey) -> Result<bool, RentSplitError>;

    async fn append_settlement(&self, record: SettlementRecord) -> Result<(), RentSplitError>;
    async fn get_settlements(&self, group_id: &str) -> Result<Vec<SettlementRecord>, RentSplitError>;

    /// Creates or bumps the retry entry for `key` in one step.
    async fn schedule_retry(
        &self,
        key: &MemberKey,
        next_run: DateTime<Utc>,
        reason: &str,
    ) -> Result<RetrySchedule, RentSplitError>;
    async fn get_retry(&self, key: &MemberKey) -> Result<Option<RetrySchedule>, RentSplitError>;
    async fn due_retries(&self, now: DateTime<Utc>) -> Result<Vec<RetrySchedule>, RentSplitError>;
    async fn clear_retry(&self, key: &MemberKey) -> Result<bool, RentSplitError>;

    async fn save_channel_status(&self, status: ChannelStatus) -> Result<(), RentSplitError>;
    async fn get_channel_status(&self, group_id: &str) -> Result<Option<ChannelStatus>, RentSplitError>;
}

pub mod in_memory;
