// Activity and notification kinds.
pub const GROUP_CREATED: &str = "group_created";
pub const MEMBER_JOINED: &str = "member_joined";
pub const MEMBER_LEFT: &str = "member_left";
pub const INVITE_CREATED: &str = "invite_created";
pub const INVITE_SENT: &str = "invite_sent";
pub const RENT_DUE_DAY_CHANGED: &str = "rent_due_day_changed";
pub const AUTOPAY_INITIATED: &str = "autopay_initiated";
pub const AUTOPAY_APPROVED: &str = "autopay_approved";
pub const RENT_REMINDER: &str = "rent_reminder";
pub const PAYMENT_UPDATE: &str = "payment_update_group";
pub const ANNOUNCEMENT: &str = "announcement";
pub const PAYMENT_PAID: &str = "payment_paid";
pub const PAYMENT_FAILED: &str = "payment_failed";
pub const SETTLEMENT_STARTED: &str = "settlement_started";
pub const SETTLEMENT_CREATED: &str = "settlement_created";

pub const PAYMENT_METHOD: &str = "x402";
pub const REASON_NOT_AUTHORIZED: &str = "not_authorized";
pub const REASON_NOT_APPROVED: &str = "not_approved";
pub const REASON_CHARGE_FAILED: &str = "charge_failed";

pub const REMINDER_DAYS_BEFORE_DUE: i64 = 3;
pub const RETRY_DELAY_DAYS: i64 = 1;
