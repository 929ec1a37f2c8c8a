use crate::core::errors::RentSplitError;
use crate::infrastructure::content::{ContentRecord, ContentStore, ContentStoreStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Keeps uploads in memory and hands out mock identifiers (`bafy-mock-...`).
#[derive(Clone)]
pub struct InMemoryContentStore {
    network: String,
    enabled: bool,
    documents: Arc<RwLock<HashMap<String, serde_json::Value>>>,
    records: Arc<RwLock<Vec<ContentRecord>>>,
}

impl InMemoryContentStore {
    pub fn new(network: impl Into<String>, enabled: bool) -> Self {
        InMemoryContentStore {
            network: network.into(),
            enabled,
            documents: Arc::new(RwLock::new(HashMap::new())),
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn get(&self, cid: &str) -> Option<serde_json::Value> {
        self.documents.read().await.get(cid).cloned()
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new("mainnet", false)
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn upload(&self, document: &serde_json::Value) -> Result<String, RentSplitError> {
        let bytes = serde_json::to_vec(document)
            .map_err(|e| RentSplitError::ContentStoreError(format!("Serialization failed: {}", e)))?;
        let cid = format!("bafy-mock-{}", Uuid::new_v4().simple());
        info!(cid = %cid, size = bytes.len(), "Stored settlement document");
        self.documents.write().await.insert(cid.clone(), document.clone());
        self.records.write().await.push(ContentRecord {
            cid: cid.clone(),
            size_bytes: bytes.len(),
            uploaded_at: Utc::now(),
        });
        Ok(cid)
    }

    async fn status(&self) -> Result<ContentStoreStatus, RentSplitError> {
        Ok(ContentStoreStatus {
            enabled: self.enabled,
            network: self.network.clone(),
            records: self.records.read().await.clone(),
        })
    }
}
