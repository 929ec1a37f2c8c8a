pub mod json_rpc;

use crate::core::errors::RentSplitError;
use async_trait::async_trait;

#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Native-token balance of `address`, as a decimal string in whole units.
    async fn get_balance(&self, address: &str) -> Result<String, RentSplitError>;
}
