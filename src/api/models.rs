use axum::{
    Json,
    body::Body,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::{IntoParams, ToSchema};

use crate::core::{
    errors::RentSplitError,
    models::{channel::Delivery, group::Group},
    services::NewGroup,
};
use crate::infrastructure::storage::UserLogin;

// Request bodies. Fields are optional so that missing values surface as
// domain errors instead of extractor rejections.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "privyUserId")]
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub wallet_address: Option<String>,
}

impl LoginRequest {
    pub fn into_login(self) -> Result<UserLogin, RentSplitError> {
        let user_id = self
            .user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| RentSplitError::MissingField("userId".to_string()))?;
        Ok(UserLogin {
            user_id,
            email: self.email.filter(|e| !e.trim().is_empty()),
            wallet_address: self.wallet_address.filter(|w| !w.trim().is_empty()),
        })
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub total_rent: Option<f64>,
    pub token: Option<String>,
    pub collector_address: Option<String>,
    pub rent_due_day: Option<i64>,
}

impl CreateGroupRequest {
    pub fn into_new_group(self) -> Result<NewGroup, RentSplitError> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }
        match (
            present(self.user_id),
            present(self.name),
            self.total_rent,
            present(self.token),
            present(self.collector_address),
        ) {
            (Some(owner_id), Some(name), Some(total_rent), Some(token), Some(collector_address)) => Ok(NewGroup {
                owner_id,
                name,
                total_rent,
                token,
                collector_address,
                rent_due_day: self.rent_due_day,
            }),
            _ => Err(RentSplitError::MissingRequiredFields),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupResponse {
    pub group_id: String,
    pub group: Group,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub wallet_address: Option<String>,
}

/// Body carrying only the acting user.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub user_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentDueDayRequest {
    pub user_id: Option<String>,
    pub rent_due_day: Option<i64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentDueDayResponse {
    pub ok: bool,
    pub rent_due_day: u32,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteRequest {
    pub group_id: Option<String>,
    pub user_id: Option<String>,
    pub wallet_address: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteResponse {
    pub code: String,
    pub wallet_address: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletInviteRequest {
    pub wallet_address: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteRequest {
    pub user_id: Option<String>,
    pub wallet_address: Option<String>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequest {
    pub user_id: Option<String>,
    pub due_date: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdateRequest {
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub amount: Option<f64>,
    pub token: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRequest {
    pub user_id: Option<String>,
    pub text: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Serialize, ToSchema)]
pub struct DeliveryResponse {
    pub ok: bool,
    pub delivery: Delivery,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Acting user.
    pub user_id: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChainQuery {
    /// Chain name echoed back in the response.
    pub chain: Option<String>,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for RentSplitError to implement IntoResponse
pub struct ApiError(pub RentSplitError);

impl From<RentSplitError> for ApiError {
    fn from(err: RentSplitError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(RentSplitError::MalformedBody(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            RentSplitError::MissingField(_)
            | RentSplitError::MissingRequiredFields
            | RentSplitError::InvalidInput(..)
            | RentSplitError::MalformedBody(_)
            | RentSplitError::InvalidRentDueDay
            | RentSplitError::InvalidAddress(_)
            | RentSplitError::InviteNotPending(_)
            | RentSplitError::NoMembers => StatusCode::BAD_REQUEST,
            RentSplitError::NotGroupMember(_) | RentSplitError::NotGroupOwner(..) => StatusCode::FORBIDDEN,
            RentSplitError::UserNotFound(_)
            | RentSplitError::GroupNotFound(_)
            | RentSplitError::InviteNotFound(_)
            | RentSplitError::AuthorizationNotFound(_) => StatusCode::NOT_FOUND,
            RentSplitError::NotifierUnavailable(_)
            | RentSplitError::PaymentError(_)
            | RentSplitError::ContentStoreError(_)
            | RentSplitError::ChainRpcError(_)
            | RentSplitError::StorageError(_)
            | RentSplitError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let error = match self.0 {
            RentSplitError::InvalidInput(field, detail) => {
                format!("Invalid input for {}: {}", field, detail.description)
            }
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(%status, error = %error, "Request failed");
        }
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// `axum::Json` whose rejections render as `ErrorResponse`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Largest body buffered by `ApiJsonOrDefault`; matches axum's default limit.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Like `ApiJson`, but an empty body yields `T::default()`.
pub struct ApiJsonOrDefault<T>(pub T);

impl<T, S> FromRequest<S> for ApiJsonOrDefault<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, BODY_LIMIT)
            .await
            .map_err(|e| ApiError(RentSplitError::MalformedBody(e.to_string())))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiJsonOrDefault(T::default()));
        }
        let ApiJson(value) = ApiJson::<T>::from_request(Request::from_parts(parts, Body::from(bytes)), state).await?;
        Ok(ApiJsonOrDefault(value))
    }
}
