use utoipa::OpenApi;

use crate::{
    api::models::{
        AcceptInviteRequest, AddMemberRequest, AnnouncementRequest, CreateGroupRequest, CreateGroupResponse,
        CreateInviteRequest, CreateInviteResponse, DeliveryResponse, ErrorResponse, HealthResponse,
        LoginRequest, OkResponse, PaymentUpdateRequest, ReminderRequest, RentDueDayRequest,
        RentDueDayResponse, UserRequest, WalletInviteRequest,
    },
    core::{
        models::{
            activity::ActivityEntry,
            authorization::{AuthorizationStatus, PaymentAuthorization},
            channel::{ChannelStatus, Delivery, DeliveryFailure},
            group::{Group, MemberSummary, Role},
            invite::{InviteKind, InviteStatus},
            settlement::{PaymentRecord, PaymentStatus, SettlementRecord},
            user::User,
        },
        services::{
            AutopayInitiated, AutopayState, AutopayStatus, GroupSummary, InviteAccepted, InvitePreview, MemberAdded,
            SettlementReport, WalletBalance, WalletInviteCreated,
        },
    },
    infrastructure::content::{ContentRecord, ContentStoreStatus},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::health,
        super::handlers::login,
        super::handlers::list_groups,
        super::handlers::create_group,
        super::handlers::group_summary,
        super::handlers::add_member,
        super::handlers::leave_group,
        super::handlers::set_rent_due_day,
        super::handlers::create_wallet_invite,
        super::handlers::initiate_autopay,
        super::handlers::approve_autopay,
        super::handlers::autopay_status,
        super::handlers::settle_now,
        super::handlers::list_settlements,
        super::handlers::send_reminder,
        super::handlers::send_payment_update,
        super::handlers::send_announcement,
        super::handlers::channel_status,
        super::handlers::activity_log,
        super::handlers::create_invite,
        super::handlers::preview_invite,
        super::handlers::accept_invite,
        super::handlers::wallet_balance,
        super::handlers::storage_status
    ),
    components(schemas(
        LoginRequest,
        CreateGroupRequest,
        CreateGroupResponse,
        AddMemberRequest,
        UserRequest,
        RentDueDayRequest,
        RentDueDayResponse,
        CreateInviteRequest,
        CreateInviteResponse,
        WalletInviteRequest,
        AcceptInviteRequest,
        ReminderRequest,
        PaymentUpdateRequest,
        AnnouncementRequest,
        OkResponse,
        DeliveryResponse,
        HealthResponse,
        ErrorResponse,
        User,
        Group,
        Role,
        MemberSummary,
        GroupSummary,
        MemberAdded,
        InviteKind,
        InviteStatus,
        InvitePreview,
        InviteAccepted,
        WalletInviteCreated,
        AuthorizationStatus,
        PaymentAuthorization,
        AutopayInitiated,
        AutopayState,
        AutopayStatus,
        PaymentStatus,
        PaymentRecord,
        SettlementRecord,
        SettlementReport,
        Delivery,
        DeliveryFailure,
        ChannelStatus,
        ActivityEntry,
        WalletBalance,
        ContentRecord,
        ContentStoreStatus
    )),
    tags(
        (name = "RentSplit API", description = "Shared rent groups with autopay settlement")
    )
)]
pub struct ApiDoc;
