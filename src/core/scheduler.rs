use crate::constants::REMINDER_DAYS_BEFORE_DUE;
use crate::core::models::group::{MAX_RENT_DUE_DAY, MIN_RENT_DUE_DAY};
use crate::core::services::RentSplitService;
use crate::infrastructure::logging::ActivityLog;
use crate::infrastructure::storage::Storage;
use chrono::{Datelike, Days, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

pub const DAILY: Duration = Duration::from_secs(24 * 60 * 60);

/// "October 2026".
pub fn period_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

fn due_date_in(year: i32, month: u32, rent_due_day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, rent_due_day.clamp(MIN_RENT_DUE_DAY, MAX_RENT_DUE_DAY))
}

/// This month's due date if it has not passed yet, otherwise next month's.
pub fn next_due_date(today: NaiveDate, rent_due_day: u32) -> Option<NaiveDate> {
    let this_month = due_date_in(today.year(), today.month(), rent_due_day)?;
    if today <= this_month {
        return Some(this_month);
    }
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    due_date_in(year, month, rent_due_day)
}

/// Measured against the next due date, so due days 1-3 are reminded in the previous month.
pub fn is_reminder_day(today: NaiveDate, rent_due_day: u32) -> bool {
    next_due_date(today, rent_due_day)
        .and_then(|due| due.checked_sub_days(Days::new(REMINDER_DAYS_BEFORE_DUE as u64)))
        == Some(today)
}

pub fn is_due_day(today: NaiveDate, rent_due_day: u32) -> bool {
    today.day() == rent_due_day.clamp(MIN_RENT_DUE_DAY, MAX_RENT_DUE_DAY)
}

/// Runs the daily pass at startup and then once per period. Missed ticks are
/// not caught up.
pub struct DailyScheduler<S: Storage + 'static, A: ActivityLog + 'static> {
    service: Arc<RentSplitService<S, A>>,
    period: Duration,
}

impl<S: Storage + 'static, A: ActivityLog + 'static> DailyScheduler<S, A> {
    pub fn new(service: Arc<RentSplitService<S, A>>) -> Self {
        Self::with_period(service, DAILY)
    }

    pub fn with_period(service: Arc<RentSplitService<S, A>>, period: Duration) -> Self {
        DailyScheduler { service, period }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match self.service.run_daily(Utc::now()).await {
                    Ok(report) => info!(?report, "Scheduler tick complete"),
                    Err(e) => error!(error = %e, "Scheduler tick failed"),
                }
            }
        })
    }
}
