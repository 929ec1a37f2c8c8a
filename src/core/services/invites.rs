use super::RentSplitService;
use crate::constants::{INVITE_CREATED, INVITE_SENT};
use crate::core::errors::RentSplitError;
use crate::core::models::{
    channel::Delivery,
    group::MemberSummary,
    invite::{Invite, InviteKind, InviteStatus},
    user::shorten_wallet,
};
use crate::infrastructure::logging::{ActivityEvent, ActivityLog};
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

const CODE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const CODE_LENGTH: usize = 6;

/// `inv_` / `winv_` followed by six random base36 characters.
pub(crate) fn generate_invite_code(kind: InviteKind) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", kind.code_prefix(), suffix)
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletInviteCreated {
    pub code: String,
    pub wallet_address: String,
    pub delivery: Delivery,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitePreview {
    pub code: String,
    pub group_id: String,
    pub group_name: String,
    pub total_rent: f64,
    pub token: String,
    pub collector_address: String,
    pub rent_due_day: u32,
    pub status: InviteStatus,
    pub wallet_address: Option<String>,
    pub member_count: usize,
    pub members: Vec<MemberSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteAccepted {
    pub group_id: String,
    pub user_id: String,
}

impl<S: Storage, A: ActivityLog> RentSplitService<S, A> {
    pub async fn create_invite(
        &self,
        group_id: &str,
        user_id: &str,
        wallet_address: Option<String>,
    ) -> Result<Invite, RentSplitError> {
        if group_id.trim().is_empty() || user_id.trim().is_empty() {
            return Err(RentSplitError::MissingRequiredFields);
        }
        self.validate_group_membership(group_id, user_id).await?;

        let invite = Invite {
            code: generate_invite_code(InviteKind::Code),
            group_id: group_id.to_string(),
            kind: InviteKind::Code,
            status: InviteStatus::Pending,
            created_by: Some(user_id.to_string()),
            wallet_address: wallet_address.filter(|w| !w.trim().is_empty()),
            created_at: Utc::now(),
            accepted_by: None,
            accepted_at: None,
        };
        self.storage.save_invite(invite.clone()).await?;
        self.record_activity(
            group_id,
            ActivityEvent::new(INVITE_CREATED, "Invite code created.").actor(user_id),
        )
        .await?;
        info!(group_id, code = %invite.code, "Invite created");
        Ok(invite)
    }

    pub async fn create_wallet_invite(
        &self,
        group_id: &str,
        wallet_address: &str,
        created_by: Option<&str>,
    ) -> Result<WalletInviteCreated, RentSplitError> {
        let wallet_address = wallet_address.trim();
        if wallet_address.is_empty() {
            return Err(RentSplitError::MissingField("walletAddress".to_string()));
        }
        let group = match created_by {
            Some(user_id) => self.validate_group_membership(group_id, user_id).await?,
            None => self.get_group_or_404(group_id).await?,
        };

        let invite = Invite {
            code: generate_invite_code(InviteKind::Wallet),
            group_id: group_id.to_string(),
            kind: InviteKind::Wallet,
            status: InviteStatus::Pending,
            created_by: created_by.map(String::from),
            wallet_address: Some(wallet_address.to_string()),
            created_at: Utc::now(),
            accepted_by: None,
            accepted_at: None,
        };
        self.storage.save_invite(invite.clone()).await?;

        let delivery = match self
            .notifier
            .send_invite(&group.id, &group.name, wallet_address, &invite.code)
            .await
        {
            Ok(delivery) => delivery,
            Err(e) => {
                warn!(group_id, error = %e, "Invite delivery failed");
                Delivery::unavailable(e.to_string())
            }
        };

        let mut event = ActivityEvent::new(INVITE_SENT, format!("Invite sent to {}.", shorten_wallet(wallet_address)));
        if let Some(user_id) = created_by {
            event = event.actor(user_id);
        }
        self.record_activity(group_id, event).await?;

        info!(group_id, code = %invite.code, delivered = delivery.delivered_any(), "Wallet invite created");
        Ok(WalletInviteCreated {
            code: invite.code,
            wallet_address: wallet_address.to_string(),
            delivery,
        })
    }

    pub async fn preview_invite(&self, code: &str) -> Result<InvitePreview, RentSplitError> {
        let invite = self
            .storage
            .get_invite(code)
            .await?
            .ok_or_else(|| RentSplitError::InviteNotFound(code.to_string()))?;
        let group = self.get_group_or_404(&invite.group_id).await?;
        let members = self.member_summaries(&group).await?;
        Ok(InvitePreview {
            code: invite.code,
            group_id: group.id,
            group_name: group.name,
            total_rent: group.total_rent,
            token: group.token,
            collector_address: group.collector_address,
            rent_due_day: group.rent_due_day,
            status: invite.status,
            wallet_address: invite.wallet_address,
            member_count: members.len(),
            members,
        })
    }

    pub async fn accept_invite(
        &self,
        code: &str,
        user_id: Option<&str>,
        wallet_address: Option<&str>,
    ) -> Result<InviteAccepted, RentSplitError> {
        let invite = self
            .storage
            .get_invite(code)
            .await?
            .ok_or_else(|| RentSplitError::InviteNotFound(code.to_string()))?;
        if !invite.is_pending() {
            return Err(RentSplitError::InviteNotPending(code.to_string()));
        }
        let group = self.get_group_or_404(&invite.group_id).await?;

        let user_id = user_id.map(str::trim).filter(|id| !id.is_empty());
        let wallet_address = wallet_address
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .or(invite.wallet_address.as_deref());
        let user = match (user_id, wallet_address) {
            (Some(user_id), _) => self
                .storage
                .get_user(user_id)
                .await?
                .ok_or_else(|| RentSplitError::UserNotFound(user_id.to_string()))?,
            (None, Some(wallet)) => self.storage.find_or_create_wallet_user(wallet).await?,
            (None, None) => return Err(RentSplitError::MissingField("userId or walletAddress".to_string())),
        };

        self.storage.accept_invite(code, &user.id, Utc::now()).await?;
        self.join_group(&group, &user, "joined the group via invite").await?;

        info!(group_id = %group.id, user_id = %user.id, code, "Invite accepted");
        Ok(InviteAccepted {
            group_id: group.id,
            user_id: user.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_codes_have_prefix_and_base36_suffix() {
        let code = generate_invite_code(InviteKind::Code);
        assert!(code.starts_with("inv_"));
        let suffix = &code["inv_".len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));

        assert!(generate_invite_code(InviteKind::Wallet).starts_with("winv_"));
    }
}
