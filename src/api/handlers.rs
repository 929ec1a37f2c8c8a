use crate::{
    api::models::*,
    core::{
        errors::RentSplitError,
        models::{
            activity::ActivityEntry, authorization::PaymentAuthorization, channel::ChannelStatus, group::Group,
            settlement::SettlementRecord, user::User,
        },
        services::{
            AutopayInitiated, AutopayStatus, GroupSummary, InviteAccepted, InvitePreview, MemberAdded,
            RentSplitService, SettlementReport, SettlementTrigger, WalletBalance, WalletInviteCreated,
        },
    },
    infrastructure::{
        content::ContentStoreStatus, logging::in_memory::InMemoryActivityLog, storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use chrono::Utc;
use std::sync::Arc;

pub type AppService = RentSplitService<InMemoryStorage, InMemoryActivityLog>;

fn required(field: &str, value: Option<String>) -> Result<String, RentSplitError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| RentSplitError::MissingField(field.to_string()))
}

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{group_id}/summary", get(group_summary))
        .route("/groups/{group_id}/members", post(add_member))
        .route("/groups/{group_id}/leave", post(leave_group))
        .route("/groups/{group_id}/rent-due-day", patch(set_rent_due_day))
        .route("/groups/{group_id}/invites/wallet", post(create_wallet_invite))
        .route("/groups/{group_id}/autopay/initiate", post(initiate_autopay))
        .route("/groups/{group_id}/autopay/approve", post(approve_autopay))
        .route("/groups/{group_id}/autopay/status", get(autopay_status))
        .route("/groups/{group_id}/settle-now", post(settle_now))
        .route("/groups/{group_id}/settlements", get(list_settlements))
        .route("/groups/{group_id}/notify/reminder", post(send_reminder))
        .route("/groups/{group_id}/notify/payment-update", post(send_payment_update))
        .route("/groups/{group_id}/notify/announcement", post(send_announcement))
        .route("/groups/{group_id}/channel", get(channel_status))
        .route("/groups/{group_id}/activity", get(activity_log))
        .route("/invites", post(create_invite))
        .route("/invites/{code}", get(preview_invite))
        .route("/invites/{code}/accept", post(accept_invite))
        .route("/wallets/{address}/balance", get(wallet_balance))
        .route("/storage/status", get(storage_status))
        .with_state(service)
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "User upserted", body = User),
        (status = 400, description = "Missing userId", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login(
    State(service): State<Arc<AppService>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<User>, ApiError> {
    let user = service.login(req.into_login()?).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/groups",
    params(UserQuery),
    responses(
        (status = 200, description = "Groups the user belongs to", body = [Group]),
        (status = 400, description = "Missing userId", body = ErrorResponse)
    )
)]
pub async fn list_groups(
    State(service): State<Arc<AppService>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let user_id = required("userId", query.user_id)?;
    let groups = service.list_groups(&user_id).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    post,
    path = "/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created", body = CreateGroupResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_group(
    State(service): State<Arc<AppService>>,
    ApiJson(req): ApiJson<CreateGroupRequest>,
) -> Result<Json<CreateGroupResponse>, ApiError> {
    let group = service.create_group(req.into_new_group()?).await?;
    Ok(Json(CreateGroupResponse {
        group_id: group.id.clone(),
        group,
    }))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}/summary",
    params(("group_id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group, members, equal share and channel status", body = GroupSummary),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn group_summary(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupSummary>, ApiError> {
    Ok(Json(service.summary(&group_id).await?))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/members",
    params(("group_id" = String, Path, description = "Group id")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added", body = MemberAdded),
        (status = 400, description = "Missing walletAddress", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn add_member(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> Result<Json<MemberAdded>, ApiError> {
    let wallet_address = req.wallet_address.unwrap_or_default();
    Ok(Json(service.add_member_by_wallet(&group_id, &wallet_address).await?))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/leave",
    params(("group_id" = String, Path, description = "Group id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "Left the group", body = OkResponse),
        (status = 400, description = "Missing userId", body = ErrorResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn leave_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ApiJson(req): ApiJson<UserRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let user_id = required("userId", req.user_id)?;
    service.leave_group(&group_id, &user_id).await?;
    Ok(Json(OkResponse { ok: true }))
}

#[utoipa::path(
    patch,
    path = "/groups/{group_id}/rent-due-day",
    params(("group_id" = String, Path, description = "Group id")),
    request_body = RentDueDayRequest,
    responses(
        (status = 200, description = "Due day updated", body = RentDueDayResponse),
        (status = 400, description = "Day outside 1-28", body = ErrorResponse),
        (status = 403, description = "Not the group owner", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn set_rent_due_day(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ApiJson(req): ApiJson<RentDueDayRequest>,
) -> Result<Json<RentDueDayResponse>, ApiError> {
    let user_id = required("userId", req.user_id)?;
    let day = req
        .rent_due_day
        .ok_or_else(|| RentSplitError::MissingField("rentDueDay".to_string()))?;
    let group = service.set_rent_due_day(&group_id, &user_id, day).await?;
    Ok(Json(RentDueDayResponse {
        ok: true,
        rent_due_day: group.rent_due_day,
    }))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/invites/wallet",
    params(("group_id" = String, Path, description = "Group id")),
    request_body = WalletInviteRequest,
    responses(
        (status = 200, description = "Invite created and dispatched", body = WalletInviteCreated),
        (status = 400, description = "Missing walletAddress", body = ErrorResponse),
        (status = 403, description = "Inviter is not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn create_wallet_invite(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ApiJson(req): ApiJson<WalletInviteRequest>,
) -> Result<Json<WalletInviteCreated>, ApiError> {
    let wallet_address = required("walletAddress", req.wallet_address)?;
    let created_by = req.user_id.filter(|id| !id.trim().is_empty());
    let invite = service
        .create_wallet_invite(&group_id, &wallet_address, created_by.as_deref())
        .await?;
    Ok(Json(invite))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/autopay/initiate",
    params(("group_id" = String, Path, description = "Group id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "Pending authorization created", body = AutopayInitiated),
        (status = 400, description = "Missing userId", body = ErrorResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn initiate_autopay(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ApiJson(req): ApiJson<UserRequest>,
) -> Result<Json<AutopayInitiated>, ApiError> {
    let user_id = required("userId", req.user_id)?;
    Ok(Json(service.initiate_autopay(&group_id, &user_id).await?))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/autopay/approve",
    params(("group_id" = String, Path, description = "Group id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "Authorization approved", body = PaymentAuthorization),
        (status = 404, description = "Group or authorization not found", body = ErrorResponse)
    )
)]
pub async fn approve_autopay(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ApiJson(req): ApiJson<UserRequest>,
) -> Result<Json<PaymentAuthorization>, ApiError> {
    let user_id = required("userId", req.user_id)?;
    Ok(Json(service.approve_autopay(&group_id, &user_id).await?))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}/autopay/status",
    params(("group_id" = String, Path, description = "Group id"), UserQuery),
    responses(
        (status = 200, description = "Authorization state", body = AutopayStatus),
        (status = 400, description = "Missing userId", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn autopay_status(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<AutopayStatus>, ApiError> {
    let user_id = required("userId", query.user_id)?;
    Ok(Json(service.autopay_status(&group_id, &user_id).await?))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/settle-now",
    params(("group_id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Settlement recorded", body = SettlementReport),
        (status = 400, description = "No members in group", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn settle_now(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<SettlementReport>, ApiError> {
    let report = service.settle(&group_id, SettlementTrigger::Manual, Utc::now()).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}/settlements",
    params(("group_id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Settlement log, oldest first", body = Vec<SettlementRecord>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn list_settlements(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<SettlementRecord>>, ApiError> {
    Ok(Json(service.list_settlements(&group_id).await?))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/notify/reminder",
    params(("group_id" = String, Path, description = "Group id")),
    request_body = ReminderRequest,
    responses(
        (status = 200, description = "Reminder broadcast", body = DeliveryResponse),
        (status = 403, description = "Not the group owner", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn send_reminder(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ApiJsonOrDefault(req): ApiJsonOrDefault<ReminderRequest>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let delivery = service
        .send_reminder(
            &group_id,
            req.user_id.as_deref(),
            req.due_date.as_deref(),
            req.note.as_deref(),
        )
        .await?;
    Ok(Json(DeliveryResponse { ok: true, delivery }))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/notify/payment-update",
    params(("group_id" = String, Path, description = "Group id")),
    request_body = PaymentUpdateRequest,
    responses(
        (status = 200, description = "Update broadcast", body = DeliveryResponse),
        (status = 403, description = "Not the group owner", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn send_payment_update(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ApiJsonOrDefault(req): ApiJsonOrDefault<PaymentUpdateRequest>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let delivery = service
        .send_payment_update(
            &group_id,
            req.user_id.as_deref(),
            req.status.as_deref(),
            req.amount,
            req.token.as_deref(),
        )
        .await?;
    Ok(Json(DeliveryResponse { ok: true, delivery }))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/notify/announcement",
    params(("group_id" = String, Path, description = "Group id")),
    request_body = AnnouncementRequest,
    responses(
        (status = 200, description = "Announcement broadcast", body = DeliveryResponse),
        (status = 400, description = "Missing text or userId", body = ErrorResponse),
        (status = 403, description = "Not the group owner", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn send_announcement(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    ApiJson(req): ApiJson<AnnouncementRequest>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let text = required("text", req.text)?;
    let user_id = required("userId", req.user_id)?;
    let delivery = service.send_announcement(&group_id, &user_id, &text).await?;
    Ok(Json(DeliveryResponse { ok: true, delivery }))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}/channel",
    params(("group_id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Last broadcast state", body = ChannelStatus),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn channel_status(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<ChannelStatus>, ApiError> {
    Ok(Json(service.channel_status(&group_id).await?))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}/activity",
    params(("group_id" = String, Path, description = "Group id"), UserQuery),
    responses(
        (status = 200, description = "Recent activity, newest first", body = Vec<ActivityEntry>),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn activity_log(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    Ok(Json(service.activity_log(&group_id, query.user_id.as_deref()).await?))
}

#[utoipa::path(
    post,
    path = "/invites",
    request_body = CreateInviteRequest,
    responses(
        (status = 200, description = "Invite code created", body = CreateInviteResponse),
        (status = 400, description = "Missing groupId or userId", body = ErrorResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn create_invite(
    State(service): State<Arc<AppService>>,
    ApiJson(req): ApiJson<CreateInviteRequest>,
) -> Result<Json<CreateInviteResponse>, ApiError> {
    let (Some(group_id), Some(user_id)) = (req.group_id, req.user_id) else {
        return Err(RentSplitError::MissingRequiredFields.into());
    };
    let invite = service.create_invite(&group_id, &user_id, req.wallet_address).await?;
    Ok(Json(CreateInviteResponse {
        code: invite.code,
        wallet_address: invite.wallet_address,
    }))
}

#[utoipa::path(
    get,
    path = "/invites/{code}",
    params(("code" = String, Path, description = "Invite code")),
    responses(
        (status = 200, description = "Invite and group preview", body = InvitePreview),
        (status = 404, description = "Invite not found", body = ErrorResponse)
    )
)]
pub async fn preview_invite(
    State(service): State<Arc<AppService>>,
    Path(code): Path<String>,
) -> Result<Json<InvitePreview>, ApiError> {
    Ok(Json(service.preview_invite(&code).await?))
}

#[utoipa::path(
    post,
    path = "/invites/{code}/accept",
    params(("code" = String, Path, description = "Invite code")),
    request_body = AcceptInviteRequest,
    responses(
        (status = 200, description = "Invite accepted", body = InviteAccepted),
        (status = 400, description = "Invite already used or no user given", body = ErrorResponse),
        (status = 404, description = "Invite, group or user not found", body = ErrorResponse)
    )
)]
pub async fn accept_invite(
    State(service): State<Arc<AppService>>,
    Path(code): Path<String>,
    ApiJsonOrDefault(req): ApiJsonOrDefault<AcceptInviteRequest>,
) -> Result<Json<InviteAccepted>, ApiError> {
    let accepted = service
        .accept_invite(&code, req.user_id.as_deref(), req.wallet_address.as_deref())
        .await?;
    Ok(Json(accepted))
}

#[utoipa::path(
    get,
    path = "/wallets/{address}/balance",
    params(("address" = String, Path, description = "0x-prefixed wallet address"), ChainQuery),
    responses(
        (status = 200, description = "Native balance", body = WalletBalance),
        (status = 400, description = "Invalid address", body = ErrorResponse),
        (status = 500, description = "Failed to fetch balance", body = ErrorResponse)
    )
)]
pub async fn wallet_balance(
    State(service): State<Arc<AppService>>,
    Path(address): Path<String>,
    Query(query): Query<ChainQuery>,
) -> Result<Json<WalletBalance>, ApiError> {
    Ok(Json(service.wallet_balance(&address, query.chain.as_deref()).await?))
}

#[utoipa::path(
    get,
    path = "/storage/status",
    responses((status = 200, description = "Content store status", body = ContentStoreStatus))
)]
pub async fn storage_status(State(service): State<Arc<AppService>>) -> Result<Json<ContentStoreStatus>, ApiError> {
    Ok(Json(service.storage_status().await?))
}
