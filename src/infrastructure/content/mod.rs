pub mod in_memory;

use crate::core::errors::RentSplitError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub cid: String,
    pub size_bytes: usize,
    #[schema(value_type = String, example = "2026-10-01T09:00:00Z")]
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentStoreStatus {
    pub enabled: bool,
    pub network: String,
    pub records: Vec<ContentRecord>,
}

/// Content-addressed storage for settlement proofs.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Stores the document and returns its content identifier.
    async fn upload(&self, document: &serde_json::Value) -> Result<String, RentSplitError>;
    async fn status(&self) -> Result<ContentStoreStatus, RentSplitError>;
}
