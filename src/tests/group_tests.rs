use super::*;
use crate::constants::{GROUP_CREATED, MEMBER_LEFT};
use crate::core::models::{MemberKey, group::Role};
use crate::infrastructure::storage::Storage;

#[tokio::test]
async fn test_flat_401_summary_for_single_owner() {
    let ctx = create_test_context();
    let owner = login(&ctx.service, "u1", Some(WALLET_A)).await;

    let group = ctx
        .service
        .create_group(NewGroup {
            collector_address: "0xabc".to_string(),
            ..flat(&owner.id, 1000.0)
        })
        .await
        .unwrap();
    assert_eq!(group.rent_due_day, 1);

    let summary = ctx.service.summary(&group.id).await.unwrap();
    assert_eq!(summary.members.len(), 1);
    assert_eq!(summary.members[0].user_id, owner.id);
    assert_eq!(summary.members[0].role, Role::Owner);
    assert!(!summary.members[0].has_autopay);
    assert_eq!(summary.your_share, Some(1000.0));
}

#[tokio::test]
async fn test_your_share_is_equal_split() {
    let ctx = create_test_context();
    login(&ctx.service, "u1", Some(WALLET_A)).await;
    let group = ctx.service.create_group(flat("u1", 1000.0)).await.unwrap();
    ctx.service.add_member_by_wallet(&group.id, WALLET_B).await.unwrap();
    ctx.service.add_member_by_wallet(&group.id, WALLET_C).await.unwrap();

    let summary = ctx.service.summary(&group.id).await.unwrap();
    assert_eq!(summary.members.len(), 3);
    assert_eq!(summary.your_share, Some(1000.0 / 3.0));
}

#[tokio::test]
async fn test_create_group_validates_input() {
    let ctx = create_test_context();

    let zero = ctx.service.create_group(flat("u1", 0.0)).await;
    assert!(matches!(zero, Err(RentSplitError::InvalidInput(field, _)) if field == "totalRent"));

    let nan = ctx.service.create_group(flat("u1", f64::NAN)).await;
    assert!(matches!(nan, Err(RentSplitError::InvalidInput(..))));

    let late = ctx
        .service
        .create_group(NewGroup {
            rent_due_day: Some(29),
            ..flat("u1", 1000.0)
        })
        .await;
    assert!(matches!(late, Err(RentSplitError::InvalidRentDueDay)));

    let blank = ctx
        .service
        .create_group(NewGroup {
            name: "  ".to_string(),
            ..flat("u1", 1000.0)
        })
        .await;
    assert!(matches!(blank, Err(RentSplitError::MissingField(field)) if field == "name"));
}

#[tokio::test]
async fn test_create_group_announces_to_creator_and_collector() {
    let ctx = create_test_context();
    login(&ctx.service, "u1", Some(WALLET_A)).await;
    let group = create_flat(&ctx.service, "u1").await;

    assert_eq!(group.conversation_id.as_deref(), Some(format!("rentsplit-{}", group.id).as_str()));
    let messages = ctx.notifier.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].recipients, vec![WALLET_A.to_string(), COLLECTOR.to_string()]);
    assert!(messages[0].text.contains("Flat 401"));

    let activity = ctx.service.activity_log(&group.id, None).await.unwrap();
    assert_eq!(activity[0].kind, GROUP_CREATED);
    assert!(!activity[0].text.contains("messaging failed"));
}

#[tokio::test]
async fn test_messaging_outage_does_not_fail_group_creation() {
    let ctx = create_test_context_with(|c| c.notifier = Arc::new(UnreachableNotifier));
    login(&ctx.service, "u1", Some(WALLET_A)).await;

    let group = create_flat(&ctx.service, "u1").await;
    assert!(group.conversation_id.is_none());

    let activity = ctx.service.activity_log(&group.id, None).await.unwrap();
    assert!(activity[0].text.contains("messaging failed"));
}

#[tokio::test]
async fn test_add_member_by_wallet_reuses_lightweight_user() {
    let ctx = create_test_context();
    let group = create_flat(&ctx.service, "u1").await;

    let mixed_case = "0xAbCdEf0000000000000000000000000000000001";

    let first = ctx.service.add_member_by_wallet(&group.id, mixed_case).await.unwrap();
    assert!(first.ok);
    assert!(first.added);
    assert_eq!(first.user_id, format!("wallet_{}", mixed_case.to_lowercase()));

    let again = ctx
        .service
        .add_member_by_wallet(&group.id, &mixed_case.to_lowercase())
        .await
        .unwrap();
    assert_eq!(again.user_id, first.user_id);
    assert!(!again.added);

    let members = ctx.service.storage().list_members(&group.id).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_add_member_to_unknown_group() {
    let ctx = create_test_context();
    let result = ctx.service.add_member_by_wallet("missing", WALLET_B).await;
    assert!(matches!(result, Err(RentSplitError::GroupNotFound(_))));
}

#[tokio::test]
async fn test_leave_group_removes_membership_and_authorization() {
    let ctx = create_test_context();
    let group = create_flat(&ctx.service, "u1").await;
    let member = ctx.service.add_member_by_wallet(&group.id, WALLET_B).await.unwrap();
    ctx.service.initiate_autopay(&group.id, &member.user_id).await.unwrap();

    ctx.service.leave_group(&group.id, &member.user_id).await.unwrap();

    let key = MemberKey::new(&group.id, &member.user_id);
    assert!(!ctx.service.storage().is_group_member(&key).await.unwrap());
    assert!(ctx.service.storage().get_authorization(&key).await.unwrap().is_none());
    let activity = ctx.service.activity_log(&group.id, None).await.unwrap();
    assert_eq!(activity[0].kind, MEMBER_LEFT);

    let again = ctx.service.leave_group(&group.id, &member.user_id).await;
    assert!(matches!(again, Err(RentSplitError::NotGroupMember(_))));
}

#[tokio::test]
async fn test_owner_may_leave() {
    let ctx = create_test_context();
    let group = create_flat(&ctx.service, "u1").await;
    ctx.service.leave_group(&group.id, "u1").await.unwrap();

    let summary = ctx.service.summary(&group.id).await.unwrap();
    assert!(summary.members.is_empty());
    assert_eq!(summary.your_share, None);
}

#[tokio::test]
async fn test_list_groups_returns_memberships() {
    let ctx = create_test_context();
    let first = create_flat(&ctx.service, "u1").await;
    let second = create_flat(&ctx.service, "u2").await;
    let joined = ctx.service.add_member_by_wallet(&second.id, WALLET_A).await.unwrap();

    let groups = ctx.service.list_groups("u1").await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, first.id);

    let groups = ctx.service.list_groups(&joined.user_id).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, second.id);

    assert!(matches!(
        ctx.service.list_groups("").await,
        Err(RentSplitError::MissingField(_))
    ));
}

#[tokio::test]
async fn test_set_rent_due_day_is_owner_only() {
    let ctx = create_test_context();
    let group = create_flat(&ctx.service, "u1").await;
    let member = ctx.service.add_member_by_wallet(&group.id, WALLET_B).await.unwrap();

    let denied = ctx.service.set_rent_due_day(&group.id, &member.user_id, 10).await;
    assert!(matches!(denied, Err(RentSplitError::NotGroupOwner(..))));

    let invalid = ctx.service.set_rent_due_day(&group.id, "u1", 0).await;
    assert!(matches!(invalid, Err(RentSplitError::InvalidRentDueDay)));

    let updated = ctx.service.set_rent_due_day(&group.id, "u1", 10).await.unwrap();
    assert_eq!(updated.rent_due_day, 10);
}

#[tokio::test]
async fn test_announcement_requires_text_and_owner() {
    let ctx = create_test_context();
    login(&ctx.service, "u1", Some(WALLET_A)).await;
    let group = create_flat(&ctx.service, "u1").await;
    let member = ctx.service.add_member_by_wallet(&group.id, WALLET_B).await.unwrap();

    let empty = ctx.service.send_announcement(&group.id, "u1", "   ").await;
    assert!(matches!(empty, Err(RentSplitError::MissingField(field)) if field == "text"));

    let denied = ctx.service.send_announcement(&group.id, &member.user_id, "Hi").await;
    assert!(matches!(denied, Err(RentSplitError::NotGroupOwner(..))));

    let delivery = ctx.service.send_announcement(&group.id, "u1", "Water is off Friday").await.unwrap();
    assert_eq!(delivery.sent.len(), 3);

    let channel = ctx.service.channel_status(&group.id).await.unwrap();
    assert_eq!(channel.last_message.as_deref(), Some("📢 Water is off Friday"));
    assert!(channel.last_sent_at.is_some());
}

#[tokio::test]
async fn test_reminder_text_and_owner_check() {
    let ctx = create_test_context();
    let group = create_flat(&ctx.service, "u1").await;
    let member = ctx.service.add_member_by_wallet(&group.id, WALLET_B).await.unwrap();

    let denied = ctx
        .service
        .send_reminder(&group.id, Some(&member.user_id), None, None)
        .await;
    assert!(matches!(denied, Err(RentSplitError::NotGroupOwner(..))));

    ctx.service
        .send_reminder(&group.id, None, Some("Nov 1"), None)
        .await
        .unwrap();
    let messages = ctx.notifier.messages().await;
    let last = messages.last().unwrap();
    assert_eq!(last.text, "Rent reminder for \"Flat 401\": 1000 USDC is due by Nov 1.");
}

#[tokio::test]
async fn test_activity_log_is_members_only() {
    let ctx = create_test_context();
    let group = create_flat(&ctx.service, "u1").await;

    let denied = ctx.service.activity_log(&group.id, Some("stranger")).await;
    assert!(matches!(denied, Err(RentSplitError::NotGroupMember(_))));
    assert!(!ctx.service.activity_log(&group.id, Some("u1")).await.unwrap().is_empty());
}
