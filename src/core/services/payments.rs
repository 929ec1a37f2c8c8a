use super::{BroadcastMeta, RentSplitService};
use crate::constants::{
    AUTOPAY_APPROVED, AUTOPAY_INITIATED, PAYMENT_FAILED, PAYMENT_METHOD, PAYMENT_PAID, REASON_CHARGE_FAILED,
    REASON_NOT_APPROVED, REASON_NOT_AUTHORIZED, RETRY_DELAY_DAYS, SETTLEMENT_CREATED, SETTLEMENT_STARTED,
};
use crate::core::errors::RentSplitError;
use crate::core::models::{
    MemberKey,
    authorization::{AuthorizationStatus, PaymentAuthorization},
    channel::Delivery,
    group::Group,
    retry::RetrySchedule,
    settlement::{PaymentRecord, PaymentStatus, SettlementRecord},
    user::display_name_or_unknown,
};
use crate::core::scheduler::period_label;
use crate::infrastructure::logging::{ActivityEvent, ActivityLog};
use crate::infrastructure::payments::ChargeRequest;
use crate::infrastructure::storage::Storage;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementTrigger {
    Manual,
    Scheduled,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutopayInitiated {
    pub approval_url: String,
    pub authorization_id: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AutopayState {
    NotAuthorized,
    Pending,
    Approved,
}

impl From<AuthorizationStatus> for AutopayState {
    fn from(status: AuthorizationStatus) -> Self {
        match status {
            AuthorizationStatus::Pending => AutopayState::Pending,
            AuthorizationStatus::Approved => AutopayState::Approved,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutopayStatus {
    pub status: AutopayState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_id: Option<String>,
}

impl From<Option<PaymentAuthorization>> for AutopayStatus {
    fn from(authorization: Option<PaymentAuthorization>) -> Self {
        match authorization {
            None => AutopayStatus {
                status: AutopayState::NotAuthorized,
                limit: None,
                token: None,
                authorization_id: None,
            },
            Some(auth) => AutopayStatus {
                status: auth.status.into(),
                limit: Some(auth.limit),
                token: Some(auth.token),
                authorization_id: Some(auth.authorization_id),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub settlement_id: String,
    /// Content-store identifier of the uploaded proof; `None` when the upload failed.
    pub settlement_cid: Option<String>,
    pub payments: Vec<PaymentRecord>,
    pub delivery: Delivery,
}

fn payment_status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "paid",
        PaymentStatus::Failed => "failed",
        PaymentStatus::Skipped => "skipped",
    }
}

impl<S: Storage, A: ActivityLog> RentSplitService<S, A> {
    pub async fn initiate_autopay(&self, group_id: &str, user_id: &str) -> Result<AutopayInitiated, RentSplitError> {
        if user_id.trim().is_empty() {
            return Err(RentSplitError::MissingField("userId".to_string()));
        }
        let group = self.validate_group_membership(group_id, user_id).await?;
        let authorization = PaymentAuthorization {
            authorization_id: format!("auth_{}", Uuid::new_v4().simple()),
            group_id: group.id.clone(),
            user_id: user_id.to_string(),
            status: AuthorizationStatus::Pending,
            limit: group.total_rent,
            token: group.token.clone(),
            created_at: Utc::now(),
            approved_at: None,
        };
        self.storage.save_authorization(authorization.clone()).await?;
        self.record_activity(
            group_id,
            ActivityEvent::new(AUTOPAY_INITIATED, "Autopay authorization requested.")
                .actor(user_id)
                .payload(json!({ "limit": authorization.limit, "token": authorization.token })),
        )
        .await?;
        info!(group_id, user_id, authorization_id = %authorization.authorization_id, "Autopay initiated");
        Ok(AutopayInitiated {
            approval_url: self.settings.approval_url.clone(),
            authorization_id: authorization.authorization_id,
        })
    }

    pub async fn approve_autopay(&self, group_id: &str, user_id: &str) -> Result<PaymentAuthorization, RentSplitError> {
        if user_id.trim().is_empty() {
            return Err(RentSplitError::MissingField("userId".to_string()));
        }
        self.get_group_or_404(group_id).await?;
        let key = MemberKey::new(group_id, user_id);
        let already_approved = self
            .storage
            .get_authorization(&key)
            .await?
            .is_some_and(|auth| auth.is_approved());
        let authorization = self.storage.approve_authorization(&key, Utc::now()).await?;
        if !already_approved {
            self.record_activity(
                group_id,
                ActivityEvent::new(AUTOPAY_APPROVED, "Autopay authorization approved.").actor(user_id),
            )
            .await?;
            info!(group_id, user_id, "Autopay approved");
        }
        Ok(authorization)
    }

    pub async fn autopay_status(&self, group_id: &str, user_id: &str) -> Result<AutopayStatus, RentSplitError> {
        if user_id.trim().is_empty() {
            return Err(RentSplitError::MissingField("userId".to_string()));
        }
        self.get_group_or_404(group_id).await?;
        let authorization = self.storage.get_authorization(&MemberKey::new(group_id, user_id)).await?;
        Ok(AutopayStatus::from(authorization))
    }

    /// Charges every member their equal share, records the result and
    /// announces it.
    pub async fn settle(
        &self,
        group_id: &str,
        trigger: SettlementTrigger,
        now: DateTime<Utc>,
    ) -> Result<SettlementReport, RentSplitError> {
        let group = self.get_group_or_404(group_id).await?;
        let members = self.storage.list_members(group_id).await?;
        let share = group.share_for(members.len()).ok_or(RentSplitError::NoMembers)?;
        let period = period_label(now.date_naive());

        if trigger == SettlementTrigger::Scheduled {
            self.notify_group(
                &group,
                &format!("⚪ Running automatic rent settlement for {}...", period),
                BroadcastMeta::kind(SETTLEMENT_STARTED),
            )
            .await?;
        }

        let mut payments = Vec::with_capacity(members.len());
        for member in &members {
            payments.push(self.attempt_charge(&group, &member.user_id, share, &period, now).await?);
        }

        let document = json!({
            "groupId": group.id,
            "total": group.total_rent,
            "token": group.token,
            "collectorAddress": group.collector_address,
            "payments": payments,
            "createdAt": now,
        });
        let settlement_cid = match self.content.upload(&document).await {
            Ok(cid) => Some(cid),
            Err(e) => {
                warn!(group_id, error = %e, "Settlement proof upload failed");
                None
            }
        };

        let record = SettlementRecord {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            content_ref: settlement_cid.clone(),
            total: group.total_rent,
            token: group.token.clone(),
            created_at: now,
        };
        self.storage.append_settlement(record.clone()).await?;

        let breakdown = payments
            .iter()
            .map(|p| {
                format!(
                    "{}: {} {} ({})",
                    p.from.as_deref().unwrap_or(&p.user_id),
                    p.amount,
                    group.token,
                    payment_status_label(p.status)
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        let proof = settlement_cid.as_deref().unwrap_or("upload failed");
        let text = match trigger {
            SettlementTrigger::Manual => format!(
                "✅ Settlement created for \"{}\": total {} {}. Breakdown: {}. Proof: {}",
                group.name, group.total_rent, group.token, breakdown, proof
            ),
            SettlementTrigger::Scheduled => {
                format!("📄 Settlement for {} completed. Proof: {}", period, proof)
            }
        };
        let paid = payments.iter().filter(|p| p.status == PaymentStatus::Paid).count();
        let summary = json!({ "settlementId": record.id, "paid": paid, "members": payments.len() });
        let delivery = self
            .notify_group(&group, &text, BroadcastMeta::kind(SETTLEMENT_CREATED).payload(summary.clone()))
            .await?;
        self.record_activity(
            group_id,
            ActivityEvent::new(
                SETTLEMENT_CREATED,
                format!(
                    "Settlement for {}: {} of {} members paid. Total {} {}.",
                    period,
                    paid,
                    payments.len(),
                    group.total_rent,
                    group.token
                ),
            )
            .payload(summary),
        )
        .await?;

        info!(group_id, settlement_id = %record.id, paid, members = payments.len(), "Settlement recorded");
        Ok(SettlementReport {
            settlement_id: record.id,
            settlement_cid,
            payments,
            delivery,
        })
    }

    /// Charges one member, announces the outcome and schedules a retry on
    /// failure. Members without an authorization are skipped.
    pub(crate) async fn attempt_charge(
        &self,
        group: &Group,
        user_id: &str,
        amount: f64,
        period: &str,
        now: DateTime<Utc>,
    ) -> Result<PaymentRecord, RentSplitError> {
        let user = self.storage.get_user(user_id).await?;
        let display = display_name_or_unknown(user.as_ref());
        let mut record = PaymentRecord {
            user_id: user_id.to_string(),
            from: user.and_then(|u| u.wallet_address),
            amount,
            method: PAYMENT_METHOD.to_string(),
            tx_ref: None,
            status: PaymentStatus::Skipped,
            reason: None,
        };

        let key = MemberKey::new(&group.id, user_id);
        let Some(authorization) = self.storage.get_authorization(&key).await? else {
            record.reason = Some(REASON_NOT_AUTHORIZED.to_string());
            return Ok(record);
        };

        let outcome = if authorization.is_approved() {
            let request = ChargeRequest {
                group_id: group.id.clone(),
                member_id: user_id.to_string(),
                authorization_id: authorization.authorization_id.clone(),
                amount,
                token: group.token.clone(),
            };
            self.payments.charge(&request).await.map_err(|e| match e {
                RentSplitError::PaymentError(reason) => reason,
                other => {
                    warn!(group_id = %group.id, user_id, error = %other, "Payment processor unavailable");
                    REASON_CHARGE_FAILED.to_string()
                }
            })
        } else {
            Err(REASON_NOT_APPROVED.to_string())
        };

        match outcome {
            Ok(receipt) => {
                info!(group_id = %group.id, user_id, amount, simulated = receipt.simulated, "Rent charged");
                record.status = PaymentStatus::Paid;
                self.notify_group(
                    group,
                    &format!("🟢 Rent paid by {} for {}. (txRef: {})", display, period, receipt.tx_ref),
                    BroadcastMeta::kind(PAYMENT_PAID)
                        .actor(user_id)
                        .payload(json!({ "amount": amount, "txRef": receipt.tx_ref })),
                )
                .await?;
                record.tx_ref = Some(receipt.tx_ref);
            }
            Err(reason) => {
                warn!(group_id = %group.id, user_id, reason = %reason, "Rent charge failed");
                record.status = PaymentStatus::Failed;
                self.notify_group(
                    group,
                    &format!("🔴 Rent payment failed for {} for {}. Will retry tomorrow.", display, period),
                    BroadcastMeta::kind(PAYMENT_FAILED)
                        .actor(user_id)
                        .payload(json!({ "amount": amount, "reason": reason })),
                )
                .await?;
                self.schedule_retry(&key, &reason, now).await?;
                record.reason = Some(reason);
            }
        }
        Ok(record)
    }

    pub(crate) async fn schedule_retry(
        &self,
        key: &MemberKey,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<RetrySchedule, RentSplitError> {
        let retry = self
            .storage
            .schedule_retry(key, now + Duration::days(RETRY_DELAY_DAYS), reason)
            .await?;
        info!(member = %key, attempts = retry.attempts, next_run = %retry.next_run, "Retry scheduled");
        Ok(retry)
    }
}
