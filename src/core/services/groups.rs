use super::{BroadcastMeta, RentSplitService};
use crate::constants::{GROUP_CREATED, MEMBER_JOINED, MEMBER_LEFT, RENT_DUE_DAY_CHANGED};
use crate::core::errors::RentSplitError;
use crate::core::models::{
    MemberKey,
    channel::ChannelStatus,
    group::{Group, MIN_RENT_DUE_DAY, MemberSummary},
    settlement::SettlementRecord,
    user::{User, display_name_or_unknown},
};
use crate::infrastructure::logging::{ActivityEvent, ActivityLog};
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validated-for-presence input of `create_group`.
#[derive(Clone, Debug)]
pub struct NewGroup {
    pub owner_id: String,
    pub name: String,
    pub total_rent: f64,
    pub token: String,
    pub collector_address: String,
    pub rent_due_day: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub group: Group,
    pub members: Vec<MemberSummary>,
    pub your_share: Option<f64>,
    pub channel: ChannelStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberAdded {
    pub ok: bool,
    pub user_id: String,
    /// `false` when the wallet already belonged to a member.
    pub added: bool,
}

impl<S: Storage, A: ActivityLog> RentSplitService<S, A> {
    pub async fn create_group(&self, new_group: NewGroup) -> Result<Group, RentSplitError> {
        self.validate_string_input("userId", &new_group.owner_id, 200)?;
        self.validate_string_input("name", &new_group.name, 100)?;
        self.validate_string_input("token", &new_group.token, 20)?;
        self.validate_string_input("collectorAddress", &new_group.collector_address, 100)?;
        self.validate_amount_input("totalRent", new_group.total_rent)?;
        let rent_due_day = self.validate_rent_due_day(new_group.rent_due_day.unwrap_or(i64::from(MIN_RENT_DUE_DAY)))?;

        let now = Utc::now();
        let mut group = Group {
            id: Uuid::new_v4().to_string(),
            name: new_group.name.trim().to_string(),
            total_rent: new_group.total_rent,
            token: new_group.token.trim().to_string(),
            collector_address: new_group.collector_address.trim().to_string(),
            owner_id: new_group.owner_id.clone(),
            rent_due_day,
            created_at: now,
            conversation_id: None,
        };
        self.storage.save_group(group.clone()).await?;
        self.storage
            .add_member(&MemberKey::new(&group.id, &group.owner_id), now)
            .await?;

        let creator = self.storage.get_user(&group.owner_id).await?;
        let actor = creator.as_ref().map(User::actor).unwrap_or_else(|| group.owner_id.clone());

        let messaging_error = match self.notifier.ensure_conversation(&group.id, &group.name).await {
            Ok(conversation_id) => {
                group.conversation_id = Some(conversation_id);
                self.storage.save_group(group.clone()).await?;
                let text = format!(
                    "🏠 Rent group \"{}\" created. Total rent: {} {}. Collector: {}.",
                    group.name, group.total_rent, group.token, group.collector_address
                );
                let delivery = self
                    .notify_group(&group, &text, BroadcastMeta::kind(GROUP_CREATED).actor(actor.clone()))
                    .await?;
                if delivery.delivered_any() {
                    None
                } else {
                    delivery.failed.first().map(|f| f.reason.clone())
                }
            }
            Err(e) => {
                warn!(group_id = %group.id, error = %e, "Could not open group conversation");
                Some(e.to_string())
            }
        };

        let mut text = format!(
            "Group \"{}\" created. Total rent: {} {}. Collector: {}.",
            group.name, group.total_rent, group.token, group.collector_address
        );
        if let Some(reason) = messaging_error {
            text.push_str(&format!(" (messaging failed: {})", reason));
        }
        self.record_activity(
            &group.id,
            ActivityEvent::new(GROUP_CREATED, text)
                .actor(actor)
                .payload(json!({ "totalRent": group.total_rent, "token": group.token })),
        )
        .await?;

        info!(group_id = %group.id, owner_id = %group.owner_id, "Group created");
        Ok(group)
    }

    pub async fn list_groups(&self, user_id: &str) -> Result<Vec<Group>, RentSplitError> {
        if user_id.trim().is_empty() {
            return Err(RentSplitError::MissingField("userId".to_string()));
        }
        self.storage.get_user_groups(user_id).await
    }

    pub async fn add_member_by_wallet(
        &self,
        group_id: &str,
        wallet_address: &str,
    ) -> Result<MemberAdded, RentSplitError> {
        let group = self.get_group_or_404(group_id).await?;
        if wallet_address.trim().is_empty() {
            return Err(RentSplitError::MissingField("walletAddress".to_string()));
        }
        let user = self.storage.find_or_create_wallet_user(wallet_address.trim()).await?;
        let added = self.join_group(&group, &user, "joined the group").await?;
        Ok(MemberAdded {
            ok: true,
            user_id: user.id,
            added,
        })
    }

    /// Adds `user` to `group` and announces it when the membership is new.
    pub(crate) async fn join_group(&self, group: &Group, user: &User, how: &str) -> Result<bool, RentSplitError> {
        let added = self
            .storage
            .add_member(&MemberKey::new(&group.id, &user.id), Utc::now())
            .await?;
        if !added {
            return Ok(false);
        }
        let display = user.display_name();
        self.notify_group(
            group,
            &format!("👤 {} has joined the rent group.", display),
            BroadcastMeta::kind(MEMBER_JOINED).actor(user.actor()),
        )
        .await?;
        self.record_activity(
            &group.id,
            ActivityEvent::new(MEMBER_JOINED, format!("{} {}.", display, how)).actor(user.actor()),
        )
        .await?;
        info!(group_id = %group.id, user_id = %user.id, "Member joined");
        Ok(true)
    }

    pub async fn leave_group(&self, group_id: &str, user_id: &str) -> Result<(), RentSplitError> {
        if user_id.trim().is_empty() {
            return Err(RentSplitError::MissingField("userId".to_string()));
        }
        let group = self.validate_group_membership(group_id, user_id).await?;
        let key = MemberKey::new(group_id, user_id);
        self.storage.remove_member(&key).await?;
        self.storage.delete_authorization(&key).await?;
        self.storage.clear_retry(&key).await?;

        let user = self.storage.get_user(user_id).await?;
        let display = display_name_or_unknown(user.as_ref());
        let actor = user.as_ref().map(User::actor).unwrap_or_else(|| user_id.to_string());
        self.notify_group(
            &group,
            &format!("👋 {} left the group.", display),
            BroadcastMeta::kind(MEMBER_LEFT).actor(actor.clone()),
        )
        .await?;
        self.record_activity(
            group_id,
            ActivityEvent::new(MEMBER_LEFT, format!("{} left the group.", display)).actor(actor),
        )
        .await?;
        info!(group_id, user_id, "Member left");
        Ok(())
    }

    pub(crate) async fn member_summaries(&self, group: &Group) -> Result<Vec<MemberSummary>, RentSplitError> {
        let mut summaries = Vec::new();
        for member in self.storage.list_members(&group.id).await? {
            let user = self.storage.get_user(&member.user_id).await?;
            let has_autopay = self
                .storage
                .get_authorization(&MemberKey::new(&group.id, &member.user_id))
                .await?
                .is_some();
            summaries.push(MemberSummary {
                role: group.role_of(&member.user_id),
                email: user.as_ref().and_then(|u| u.email.clone()),
                wallet_address: user.and_then(|u| u.wallet_address),
                user_id: member.user_id,
                has_autopay,
            });
        }
        Ok(summaries)
    }

    pub async fn summary(&self, group_id: &str) -> Result<GroupSummary, RentSplitError> {
        let group = self.get_group_or_404(group_id).await?;
        let members = self.member_summaries(&group).await?;
        let your_share = group.share_for(members.len());
        let channel = self
            .storage
            .get_channel_status(group_id)
            .await?
            .unwrap_or_else(|| ChannelStatus::empty(group_id));
        Ok(GroupSummary {
            group,
            members,
            your_share,
            channel,
        })
    }

    pub async fn set_rent_due_day(
        &self,
        group_id: &str,
        user_id: &str,
        rent_due_day: i64,
    ) -> Result<Group, RentSplitError> {
        if user_id.trim().is_empty() {
            return Err(RentSplitError::MissingField("userId".to_string()));
        }
        let mut group = self
            .validate_group_and_owner(group_id, user_id, "change the rent due day")
            .await?;
        self.validate_group_membership(group_id, user_id).await?;
        group.rent_due_day = self.validate_rent_due_day(rent_due_day)?;
        self.storage.save_group(group.clone()).await?;

        self.record_activity(
            group_id,
            ActivityEvent::new(
                RENT_DUE_DAY_CHANGED,
                format!("Rent due day changed to {}.", group.rent_due_day),
            )
            .actor(user_id),
        )
        .await?;
        info!(group_id, rent_due_day = group.rent_due_day, "Rent due day updated");
        Ok(group)
    }

    pub async fn list_settlements(&self, group_id: &str) -> Result<Vec<SettlementRecord>, RentSplitError> {
        self.get_group_or_404(group_id).await?;
        self.storage.get_settlements(group_id).await
    }
}
