use super::RentSplitService;
use crate::core::errors::RentSplitError;
use crate::core::wallet::is_wallet_address;
use crate::infrastructure::content::ContentStoreStatus;
use crate::infrastructure::logging::ActivityLog;
use crate::infrastructure::storage::Storage;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub address: String,
    pub chain: String,
    pub token: String,
    /// Ether-denominated decimal string.
    pub balance: String,
}

impl<S: Storage, A: ActivityLog> RentSplitService<S, A> {
    pub async fn wallet_balance(&self, address: &str, chain: Option<&str>) -> Result<WalletBalance, RentSplitError> {
        if !is_wallet_address(address) {
            return Err(RentSplitError::InvalidAddress(address.to_string()));
        }
        let balance = self.chain.get_balance(address).await.map_err(|e| {
            warn!(address, error = %e, "Balance lookup failed");
            match e {
                RentSplitError::ChainRpcError(_) => e,
                other => RentSplitError::ChainRpcError(other.to_string()),
            }
        })?;
        Ok(WalletBalance {
            address: address.to_string(),
            chain: chain
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(&self.settings.chain_name)
                .to_string(),
            token: self.settings.token_symbol.clone(),
            balance,
        })
    }

    pub async fn storage_status(&self) -> Result<ContentStoreStatus, RentSplitError> {
        self.content.status().await
    }
}
