use super::{BroadcastMeta, RentSplitService};
use crate::constants::{ANNOUNCEMENT, PAYMENT_UPDATE, RENT_REMINDER};
use crate::core::errors::RentSplitError;
use crate::core::models::{
    MemberKey,
    activity::ActivityEntry,
    channel::{ChannelStatus, Delivery},
    group::Group,
};
use crate::infrastructure::logging::{ActivityEvent, ActivityLog};
use crate::infrastructure::storage::Storage;
use serde_json::json;
use tracing::info;

/// Blank strings count as absent.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn reminder_text(group: &Group, due_date: Option<&str>, note: Option<&str>) -> String {
    let due = match due_date {
        Some(date) => format!("by {}", date),
        None => "soon".to_string(),
    };
    let mut text = format!(
        "Rent reminder for \"{}\": {} {} is due {}.",
        group.name, group.total_rent, group.token, due
    );
    if let Some(note) = note {
        text.push(' ');
        text.push_str(note);
    }
    text
}

impl<S: Storage, A: ActivityLog> RentSplitService<S, A> {
    async fn group_for_sender(&self, group_id: &str, user_id: Option<&str>, action: &str) -> Result<Group, RentSplitError> {
        match non_empty(user_id) {
            Some(user_id) => self.validate_group_and_owner(group_id, user_id, action).await,
            None => self.get_group_or_404(group_id).await,
        }
    }

    pub async fn send_reminder(
        &self,
        group_id: &str,
        user_id: Option<&str>,
        due_date: Option<&str>,
        note: Option<&str>,
    ) -> Result<Delivery, RentSplitError> {
        let group = self.group_for_sender(group_id, user_id, "send reminders").await?;
        let text = reminder_text(&group, non_empty(due_date), non_empty(note));
        let mut meta = BroadcastMeta::kind(RENT_REMINDER);
        if let Some(user_id) = non_empty(user_id) {
            meta = meta.actor(user_id);
        }
        let delivery = self.notify_group(&group, &text, meta).await?;
        self.record_activity(group_id, ActivityEvent::new(RENT_REMINDER, text)).await?;
        info!(group_id, sent = delivery.sent.len(), "Rent reminder sent");
        Ok(delivery)
    }

    pub async fn send_payment_update(
        &self,
        group_id: &str,
        user_id: Option<&str>,
        status: Option<&str>,
        amount: Option<f64>,
        token: Option<&str>,
    ) -> Result<Delivery, RentSplitError> {
        let group = self.group_for_sender(group_id, user_id, "send payment updates").await?;
        let status = non_empty(status).unwrap_or("updated");
        let token = non_empty(token).unwrap_or(&group.token).to_string();
        let text = match amount {
            Some(amount) => format!("💸 Payment update for \"{}\": {} {} {}.", group.name, amount, token, status),
            None => format!("💸 Payment update for \"{}\": {}.", group.name, status),
        };
        let mut meta = BroadcastMeta::kind(PAYMENT_UPDATE).payload(json!({
            "status": status,
            "amount": amount,
            "token": token,
        }));
        if let Some(user_id) = non_empty(user_id) {
            meta = meta.actor(user_id);
        }
        let delivery = self.notify_group(&group, &text, meta).await?;
        self.record_activity(group_id, ActivityEvent::new(PAYMENT_UPDATE, text)).await?;
        Ok(delivery)
    }

    pub async fn send_announcement(&self, group_id: &str, user_id: &str, text: &str) -> Result<Delivery, RentSplitError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RentSplitError::MissingField("text".to_string()));
        }
        if user_id.trim().is_empty() {
            return Err(RentSplitError::MissingField("userId".to_string()));
        }
        let group = self.validate_group_and_owner(group_id, user_id, "post announcements").await?;
        let message = format!("📢 {}", text);
        let delivery = self
            .notify_group(&group, &message, BroadcastMeta::kind(ANNOUNCEMENT).actor(user_id))
            .await?;
        self.record_activity(group_id, ActivityEvent::new(ANNOUNCEMENT, text).actor(user_id))
            .await?;
        Ok(delivery)
    }

    pub async fn channel_status(&self, group_id: &str) -> Result<ChannelStatus, RentSplitError> {
        let group = self.get_group_or_404(group_id).await?;
        let status = self.storage.get_channel_status(group_id).await?;
        Ok(status.unwrap_or_else(|| ChannelStatus {
            conversation_id: group.conversation_id,
            ..ChannelStatus::empty(group_id)
        }))
    }

    pub async fn activity_log(&self, group_id: &str, user_id: Option<&str>) -> Result<Vec<ActivityEntry>, RentSplitError> {
        self.get_group_or_404(group_id).await?;
        if let Some(user_id) = non_empty(user_id) {
            if !self.storage.is_group_member(&MemberKey::new(group_id, user_id)).await? {
                return Err(RentSplitError::NotGroupMember(user_id.to_string()));
            }
        }
        self.activity.recent(group_id).await
    }
}
