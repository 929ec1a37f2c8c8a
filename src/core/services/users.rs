use super::RentSplitService;
use crate::core::errors::RentSplitError;
use crate::core::models::user::User;
use crate::infrastructure::logging::ActivityLog;
use crate::infrastructure::storage::{Storage, UserLogin};
use tracing::info;

impl<S: Storage, A: ActivityLog> RentSplitService<S, A> {
    pub async fn login(&self, login: UserLogin) -> Result<User, RentSplitError> {
        if login.user_id.trim().is_empty() {
            return Err(RentSplitError::MissingField("userId".to_string()));
        }
        let user = self.storage.upsert_user(login).await?;
        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }
}
