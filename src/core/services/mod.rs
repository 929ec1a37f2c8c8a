mod daily;
mod groups;
mod invites;
mod notifications;
mod payments;
mod users;
mod wallets;

pub use daily::DailyRunReport;
pub use groups::{GroupSummary, MemberAdded, NewGroup};
pub use invites::{InviteAccepted, InvitePreview, WalletInviteCreated};
pub use payments::{AutopayInitiated, AutopayState, AutopayStatus, SettlementReport, SettlementTrigger};
pub use wallets::WalletBalance;

use crate::core::errors::{FieldError, RentSplitError};
use crate::core::models::{
    MemberKey,
    channel::{ChannelStatus, Delivery},
    group::{Group, MAX_RENT_DUE_DAY, MIN_RENT_DUE_DAY},
};
use crate::infrastructure::chain::ChainRpc;
use crate::infrastructure::content::ContentStore;
use crate::infrastructure::logging::{ActivityEvent, ActivityLog};
use crate::infrastructure::notifier::{Broadcast, Notifier};
use crate::infrastructure::payments::PaymentProcessor;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

/// The external systems the service talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub payments: Arc<dyn PaymentProcessor>,
    pub content: Arc<dyn ContentStore>,
    pub chain: Arc<dyn ChainRpc>,
}

#[derive(Clone, Debug)]
pub struct ServiceSettings {
    pub approval_url: String,
    pub chain_name: String,
    pub token_symbol: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            approval_url: crate::config::DEFAULT_APPROVAL_URL.to_string(),
            chain_name: "ethereum".to_string(),
            token_symbol: "ETH".to_string(),
        }
    }
}

/// Optional best-effort extras attached to a group broadcast.
#[derive(Default)]
pub(crate) struct BroadcastMeta {
    pub kind: Option<&'static str>,
    pub actor: Option<String>,
    pub payload: Option<serde_json::Value>,
}

impl BroadcastMeta {
    pub fn kind(kind: &'static str) -> Self {
        BroadcastMeta {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

pub struct RentSplitService<S: Storage, A: ActivityLog> {
    storage: S,
    activity: A,
    notifier: Arc<dyn Notifier>,
    payments: Arc<dyn PaymentProcessor>,
    content: Arc<dyn ContentStore>,
    chain: Arc<dyn ChainRpc>,
    settings: ServiceSettings,
}

impl<S: Storage, A: ActivityLog> RentSplitService<S, A> {
    pub fn new(storage: S, activity: A, collaborators: Collaborators, settings: ServiceSettings) -> Self {
        RentSplitService {
            storage,
            activity,
            notifier: collaborators.notifier,
            payments: collaborators.payments,
            content: collaborators.content,
            chain: collaborators.chain,
            settings,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn get_group_or_404(&self, group_id: &str) -> Result<Group, RentSplitError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| RentSplitError::GroupNotFound(group_id.to_string()))
    }

    async fn validate_group_membership(&self, group_id: &str, user_id: &str) -> Result<Group, RentSplitError> {
        let group = self.get_group_or_404(group_id).await?;
        if !self.storage.is_group_member(&MemberKey::new(group_id, user_id)).await? {
            return Err(RentSplitError::NotGroupMember(user_id.to_string()));
        }
        Ok(group)
    }

    async fn validate_group_and_owner(
        &self,
        group_id: &str,
        user_id: &str,
        action: &str,
    ) -> Result<Group, RentSplitError> {
        let group = self.get_group_or_404(group_id).await?;
        if !group.is_owner(user_id) {
            return Err(RentSplitError::NotGroupOwner(user_id.to_string(), action.to_string()));
        }
        Ok(group)
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), RentSplitError> {
        if value.trim().is_empty() {
            return Err(RentSplitError::MissingField(field.to_string()));
        }
        if value.len() > max_length {
            return Err(RentSplitError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("{} Too Long", field),
                    description: format!("{} cannot exceed {} characters", field, max_length),
                },
            ));
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(RentSplitError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("Invalid {}", field),
                    description: format!("{} contains invalid characters", field),
                },
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: f64) -> Result<(), RentSplitError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(RentSplitError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: "Invalid Amount".to_string(),
                    description: "Amount must be a finite number greater than 0".to_string(),
                },
            ));
        }
        Ok(())
    }

    fn validate_rent_due_day(&self, day: i64) -> Result<u32, RentSplitError> {
        if day < i64::from(MIN_RENT_DUE_DAY) || day > i64::from(MAX_RENT_DUE_DAY) {
            return Err(RentSplitError::InvalidRentDueDay);
        }
        Ok(day as u32)
    }

    /// Wallets of every member plus the collector. The notifier dedupes.
    async fn member_wallets(&self, group: &Group) -> Result<Vec<String>, RentSplitError> {
        let mut wallets = Vec::new();
        for member in self.storage.list_members(&group.id).await? {
            if let Some(wallet) = self
                .storage
                .get_user(&member.user_id)
                .await?
                .and_then(|u| u.wallet_address)
            {
                wallets.push(wallet);
            }
        }
        wallets.push(group.collector_address.clone());
        Ok(wallets)
    }

    /// Broadcasts to the group. Notifier failures are logged and returned as
    /// a failed delivery; only storage errors propagate.
    pub(crate) async fn notify_group(
        &self,
        group: &Group,
        text: &str,
        meta: BroadcastMeta,
    ) -> Result<Delivery, RentSplitError> {
        let message = Broadcast {
            group_id: group.id.clone(),
            group_name: group.name.clone(),
            recipients: self.member_wallets(group).await?,
            text: text.to_string(),
            kind: meta.kind.map(String::from),
            actor: meta.actor,
            payload: meta.payload,
        };
        let delivery = match self.notifier.broadcast(&message).await {
            Ok(delivery) => delivery,
            Err(e) => {
                warn!(group_id = %group.id, error = %e, "Group broadcast failed");
                Delivery::unavailable(e.to_string())
            }
        };
        let previous = self.storage.get_channel_status(&group.id).await?;
        let status = ChannelStatus::after_broadcast(previous, &group.id, text, &delivery, Utc::now());
        self.storage.save_channel_status(status).await?;
        Ok(delivery)
    }

    async fn record_activity(&self, group_id: &str, event: ActivityEvent) -> Result<(), RentSplitError> {
        self.activity.append(group_id, event).await?;
        Ok(())
    }
}
