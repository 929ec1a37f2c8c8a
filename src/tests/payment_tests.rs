use super::*;
use crate::constants::{REASON_NOT_APPROVED, REASON_NOT_AUTHORIZED};
use crate::core::models::{MemberKey, authorization::AuthorizationStatus, settlement::PaymentStatus};
use crate::core::services::{AutopayState, SettlementTrigger};
use crate::infrastructure::storage::Storage;
use chrono::{Duration, Utc};

#[tokio::test]
async fn test_autopay_lifecycle() {
    let ctx = create_test_context();
    let group = create_flat(&ctx.service, "u1").await;

    let status = ctx.service.autopay_status(&group.id, "u1").await.unwrap();
    assert_eq!(status.status, AutopayState::NotAuthorized);
    assert!(status.authorization_id.is_none());

    let initiated = ctx.service.initiate_autopay(&group.id, "u1").await.unwrap();
    assert_eq!(initiated.approval_url, APPROVAL_URL);

    let status = ctx.service.autopay_status(&group.id, "u1").await.unwrap();
    assert_eq!(status.status, AutopayState::Pending);
    assert_eq!(status.limit, Some(1000.0));
    assert_eq!(status.token.as_deref(), Some("USDC"));
    assert_eq!(status.authorization_id, Some(initiated.authorization_id.clone()));

    let approved = ctx.service.approve_autopay(&group.id, "u1").await.unwrap();
    assert_eq!(approved.status, AuthorizationStatus::Approved);
    let again = ctx.service.approve_autopay(&group.id, "u1").await.unwrap();
    assert_eq!(again.approved_at, approved.approved_at);

    let summary = ctx.service.summary(&group.id).await.unwrap();
    assert!(summary.members[0].has_autopay);
}

#[tokio::test]
async fn test_autopay_requires_membership() {
    let ctx = create_test_context();
    let group = create_flat(&ctx.service, "u1").await;

    let outsider = ctx.service.initiate_autopay(&group.id, "stranger").await;
    assert!(matches!(outsider, Err(RentSplitError::NotGroupMember(_))));

    let no_auth = ctx.service.approve_autopay(&group.id, "u1").await;
    assert!(matches!(no_auth, Err(RentSplitError::AuthorizationNotFound(_))));

    let unknown = ctx.service.initiate_autopay("missing", "u1").await;
    assert!(matches!(unknown, Err(RentSplitError::GroupNotFound(_))));
}

#[tokio::test]
async fn test_settlement_with_no_members_writes_nothing() {
    let ctx = create_test_context();
    let group = create_flat(&ctx.service, "u1").await;
    ctx.service.leave_group(&group.id, "u1").await.unwrap();

    let result = ctx.service.settle(&group.id, SettlementTrigger::Manual, Utc::now()).await;
    assert!(matches!(result, Err(RentSplitError::NoMembers)));
    assert!(ctx.service.list_settlements(&group.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_settlement_outcomes_per_member() {
    let ctx = create_test_context();
    login(&ctx.service, "u1", Some(WALLET_A)).await;
    let group = create_flat(&ctx.service, "u1").await;
    let pending = ctx.service.add_member_by_wallet(&group.id, WALLET_B).await.unwrap();
    let unauthorized = ctx.service.add_member_by_wallet(&group.id, WALLET_C).await.unwrap();

    ctx.service.initiate_autopay(&group.id, "u1").await.unwrap();
    ctx.service.approve_autopay(&group.id, "u1").await.unwrap();
    ctx.service.initiate_autopay(&group.id, &pending.user_id).await.unwrap();

    let report = ctx
        .service
        .settle(&group.id, SettlementTrigger::Manual, Utc::now())
        .await
        .unwrap();
    assert_eq!(report.payments.len(), 3);

    let outcome = |user_id: &str| report.payments.iter().find(|p| p.user_id == user_id).unwrap().clone();
    let owner = outcome("u1");
    assert_eq!(owner.status, PaymentStatus::Paid);
    assert_eq!(owner.amount, 1000.0 / 3.0);
    assert_eq!(owner.from.as_deref(), Some(WALLET_A));
    assert!(owner.tx_ref.is_some());

    let not_approved = outcome(&pending.user_id);
    assert_eq!(not_approved.status, PaymentStatus::Failed);
    assert_eq!(not_approved.reason.as_deref(), Some(REASON_NOT_APPROVED));

    let skipped = outcome(&unauthorized.user_id);
    assert_eq!(skipped.status, PaymentStatus::Skipped);
    assert_eq!(skipped.reason.as_deref(), Some(REASON_NOT_AUTHORIZED));

    let storage = ctx.service.storage();
    assert!(storage.get_retry(&MemberKey::new(&group.id, &pending.user_id)).await.unwrap().is_some());
    assert!(storage.get_retry(&MemberKey::new(&group.id, &unauthorized.user_id)).await.unwrap().is_none());
    assert!(storage.get_retry(&MemberKey::new(&group.id, "u1")).await.unwrap().is_none());

    let cid = report.settlement_cid.clone().unwrap();
    let document = ctx.content.get(&cid).await.unwrap();
    assert_eq!(document["groupId"], group.id.as_str());
    assert_eq!(document["collectorAddress"], COLLECTOR);
    assert_eq!(document["payments"].as_array().unwrap().len(), 3);

    let settlements = ctx.service.list_settlements(&group.id).await.unwrap();
    assert_eq!(settlements.len(), 1);
    assert_eq!(settlements[0].id, report.settlement_id);
    assert_eq!(settlements[0].content_ref, Some(cid));

    let texts: Vec<String> = ctx.notifier.messages().await.into_iter().map(|m| m.text).collect();
    assert!(texts.iter().any(|t| t.starts_with("🟢 Rent paid by u1@example.com")));
    assert!(texts.iter().any(|t| t.starts_with("🔴 Rent payment failed") && t.ends_with("Will retry tomorrow.")));
    assert!(texts.last().unwrap().starts_with("✅ Settlement created for \"Flat 401\": total 1000 USDC."));
}

#[tokio::test]
async fn test_charge_failure_bumps_a_single_retry() {
    let ctx = create_test_context_with(|c| c.payments = Arc::new(DecliningPaymentProcessor));
    let group = create_flat(&ctx.service, "u1").await;
    ctx.service.initiate_autopay(&group.id, "u1").await.unwrap();
    ctx.service.approve_autopay(&group.id, "u1").await.unwrap();
    let key = MemberKey::new(&group.id, "u1");

    let now = Utc::now();
    let report = ctx.service.settle(&group.id, SettlementTrigger::Manual, now).await.unwrap();
    assert_eq!(report.payments[0].status, PaymentStatus::Failed);
    assert_eq!(report.payments[0].reason.as_deref(), Some("insufficient_funds"));

    let retry = ctx.service.storage().get_retry(&key).await.unwrap().unwrap();
    assert_eq!(retry.attempts, 1);
    assert_eq!(retry.next_run, now + Duration::days(1));
    assert_eq!(retry.last_reason, "insufficient_funds");

    ctx.service.settle(&group.id, SettlementTrigger::Manual, now).await.unwrap();
    let retry = ctx.service.storage().get_retry(&key).await.unwrap().unwrap();
    assert_eq!(retry.attempts, 2);
    assert_eq!(ctx.service.storage().due_retries(now + Duration::days(1)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_failure_keeps_settlement() {
    let ctx = create_test_context_with(|c| c.content = Arc::new(BrokenContentStore));
    let group = create_flat(&ctx.service, "u1").await;

    let report = ctx
        .service
        .settle(&group.id, SettlementTrigger::Manual, Utc::now())
        .await
        .unwrap();
    assert!(report.settlement_cid.is_none());

    let settlements = ctx.service.list_settlements(&group.id).await.unwrap();
    assert_eq!(settlements.len(), 1);
    assert!(settlements[0].content_ref.is_none());
}

#[tokio::test]
async fn test_leaving_clears_pending_retry() {
    let ctx = create_test_context_with(|c| c.payments = Arc::new(DecliningPaymentProcessor));
    let group = create_flat(&ctx.service, "u1").await;
    let member = ctx.service.add_member_by_wallet(&group.id, WALLET_B).await.unwrap();
    ctx.service.initiate_autopay(&group.id, &member.user_id).await.unwrap();
    ctx.service.approve_autopay(&group.id, &member.user_id).await.unwrap();

    ctx.service.settle(&group.id, SettlementTrigger::Manual, Utc::now()).await.unwrap();
    let key = MemberKey::new(&group.id, &member.user_id);
    assert!(ctx.service.storage().get_retry(&key).await.unwrap().is_some());

    ctx.service.leave_group(&group.id, &member.user_id).await.unwrap();
    assert!(ctx.service.storage().get_retry(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_wallet_balance() {
    let ctx = create_test_context();
    let balance = ctx.service.wallet_balance(WALLET_A, None).await.unwrap();
    assert_eq!(balance.balance, "1.5");
    assert_eq!(balance.chain, "ethereum");
    assert_eq!(balance.token, "ETH");

    let invalid = ctx.service.wallet_balance("0x123", None).await;
    assert!(matches!(invalid, Err(RentSplitError::InvalidAddress(_))));

    let offline = create_test_context_with(|c| c.chain = Arc::new(FixedBalanceChain(None)));
    let failed = offline.service.wallet_balance(WALLET_A, Some("base")).await;
    assert!(matches!(failed, Err(RentSplitError::ChainRpcError(_))));
}
