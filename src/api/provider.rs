use crate::error::Result;
use crate::media::{AssetRole, LocalAsset, RemoteAsset};
use crate::models::Collection;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query string of a list request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ListQuery {
    pub fn first_page(size: u32) -> Self {
        Self {
            page: 1,
            size,
            sort_by: "created_at".to_string(),
            order: SortOrder::Desc,
            name: None,
        }
    }
}

/// One page of a collection listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "blogs", alias = "itineraries")]
    pub items: Vec<T>,
    pub total: u64,
    pub pages: u32,
    pub current_page: u32,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Remote CRUD over persisted blogs and itineraries.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn list(&self, collection: Collection, query: &ListQuery) -> Result<Page<Value>>;

    async fn fetch_full(&self, collection: Collection, id: &str) -> Result<Value>;

    async fn create(&self, collection: Collection, payload: Value) -> Result<Value>;

    async fn update(&self, collection: Collection, id: &str, payload: Value) -> Result<Value>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;
}

/// Durable media storage. Batch output order matches input order.
#[async_trait]
pub trait UploadGateway: Send + Sync {
    async fn upload_single(
        &self,
        collection: Collection,
        role: AssetRole,
        asset: &LocalAsset,
    ) -> Result<RemoteAsset>;

    async fn upload_batch(
        &self,
        collection: Collection,
        role: AssetRole,
        assets: &[LocalAsset],
    ) -> Result<Vec<RemoteAsset>>;
}
