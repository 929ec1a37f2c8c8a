use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Serialize)]
pub enum RentSplitError {
    #[error("{0} is required")]
    MissingField(String),
    #[error("Missing required fields")]
    MissingRequiredFields,
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("rentDueDay must be between 1 and 28")]
    InvalidRentDueDay,
    #[error("Invalid address")]
    InvalidAddress(String),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Group {0} not found")]
    GroupNotFound(String),
    #[error("Invite {0} not found")]
    InviteNotFound(String),
    #[error("Invalid invite")]
    InviteNotPending(String),
    #[error("No payment authorization for user {0}")]
    AuthorizationNotFound(String),
    #[error("User {0} is not a member of this group")]
    NotGroupMember(String),
    #[error("Only the group owner can {1}")]
    NotGroupOwner(String, String),
    #[error("No members in group")]
    NoMembers,
    #[error("Notifier unavailable: {0}")]
    NotifierUnavailable(String),
    #[error("Payment processor error: {0}")]
    PaymentError(String),
    #[error("Content store error: {0}")]
    ContentStoreError(String),
    #[error("Failed to fetch balance: {0}")]
    ChainRpcError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}
