use super::{BroadcastMeta, RentSplitService, SettlementTrigger};
use crate::constants::{REMINDER_DAYS_BEFORE_DUE, RENT_REMINDER};
use crate::core::errors::RentSplitError;
use crate::core::models::{group::Group, settlement::PaymentStatus};
use crate::core::scheduler::{is_due_day, is_reminder_day, next_due_date, period_label};
use crate::infrastructure::logging::{ActivityEvent, ActivityLog};
use crate::infrastructure::storage::Storage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

/// What one daily pass did.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRunReport {
    pub retries_attempted: usize,
    pub retries_succeeded: usize,
    pub retries_dropped: usize,
    pub reminders_sent: Vec<String>,
    pub settlements_run: Vec<String>,
}

impl<S: Storage, A: ActivityLog> RentSplitService<S, A> {
    pub async fn run_daily(&self, now: DateTime<Utc>) -> Result<DailyRunReport, RentSplitError> {
        let mut report = DailyRunReport::default();
        self.run_retries(now, &mut report).await?;

        let today = now.date_naive();
        for group in self.storage.list_groups().await? {
            if is_reminder_day(today, group.rent_due_day) {
                self.send_due_reminder(&group, now).await?;
                report.reminders_sent.push(group.id.clone());
            }
            if is_due_day(today, group.rent_due_day) {
                if self.storage.list_members(&group.id).await?.is_empty() {
                    continue;
                }
                match self.settle(&group.id, SettlementTrigger::Scheduled, now).await {
                    Ok(_) => report.settlements_run.push(group.id.clone()),
                    Err(e) => error!(group_id = %group.id, error = %e, "Scheduled settlement failed"),
                }
            }
        }

        info!(
            retries = report.retries_attempted,
            reminders = report.reminders_sent.len(),
            settlements = report.settlements_run.len(),
            "Daily run finished"
        );
        Ok(report)
    }

    async fn run_retries(&self, now: DateTime<Utc>, report: &mut DailyRunReport) -> Result<(), RentSplitError> {
        for retry in self.storage.due_retries(now).await? {
            let key = retry.key();
            let group = self.storage.get_group(&retry.group_id).await?;
            let still_member = self.storage.is_group_member(&key).await?;
            let Some(group) = group.filter(|_| still_member) else {
                self.storage.clear_retry(&key).await?;
                report.retries_dropped += 1;
                continue;
            };
            let members = self.storage.list_members(&group.id).await?;
            let Some(share) = group.share_for(members.len()) else {
                continue;
            };
            let period = period_label(now.date_naive());
            report.retries_attempted += 1;
            let record = self.attempt_charge(&group, &retry.user_id, share, &period, now).await?;
            match record.status {
                PaymentStatus::Paid => {
                    self.storage.clear_retry(&key).await?;
                    report.retries_succeeded += 1;
                }
                // Authorization withdrawn: nothing left to retry.
                PaymentStatus::Skipped => {
                    self.storage.clear_retry(&key).await?;
                    report.retries_dropped += 1;
                }
                PaymentStatus::Failed => {}
            }
        }
        Ok(())
    }

    async fn send_due_reminder(&self, group: &Group, now: DateTime<Utc>) -> Result<(), RentSplitError> {
        let today = now.date_naive();
        let period = next_due_date(today, group.rent_due_day)
            .map(period_label)
            .unwrap_or_else(|| period_label(today));
        let text = format!(
            "🟡 Rent is due in {} days for {}. Please make sure your wallet has enough balance.",
            REMINDER_DAYS_BEFORE_DUE, period
        );
        self.notify_group(group, &text, BroadcastMeta::kind(RENT_REMINDER)).await?;
        self.record_activity(&group.id, ActivityEvent::new(RENT_REMINDER, text)).await?;
        Ok(())
    }
}
