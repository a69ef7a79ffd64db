//! In-memory collaborators shared by the unit tests.

use crate::api::{ContentApi, ListQuery, Page, UploadGateway};
use crate::error::Result;
use crate::media::{AssetRole, LocalAsset, MediaReference, MediaSlot, RemoteAsset};
use crate::models::{BlogDraft, Collection, Day, Hotel, ItineraryDraft, Section};
use crate::pipeline::UploadMode;
use crate::DashboardError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Barrier, Notify};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct UploadCall {
    pub mode: UploadMode,
    pub role: AssetRole,
    pub asset_ids: Vec<Uuid>,
}

#[derive(Default)]
pub struct MockGateway {
    calls: Mutex<Vec<UploadCall>>,
    responses: Mutex<VecDeque<RemoteAsset>>,
    counter: AtomicUsize,
    fail_role: Option<AssetRole>,
    short_batches: bool,
    gate: Option<Arc<Notify>>,
    barrier: Option<Arc<Barrier>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, role: AssetRole) -> Self {
        self.fail_role = Some(role);
        self
    }

    /// Queues a fixed response for the next uploaded asset.
    pub fn with_response(self, asset_id: &str, url: &str) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(RemoteAsset {
                asset_id: asset_id.to_string(),
                url: url.to_string(),
            });
        }
        self
    }

    pub fn short_batches(mut self) -> Self {
        self.short_batches = true;
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn calls(&self) -> Vec<UploadCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_asset(&self) -> RemoteAsset {
        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return response;
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        RemoteAsset {
            asset_id: format!("asset-{}", n),
            url: format!("https://cdn.test/asset-{}.png", n),
        }
    }

    async fn record(&self, mode: UploadMode, role: AssetRole, assets: &[&LocalAsset]) -> Result<()> {
        self.calls.lock().unwrap().push(UploadCall {
            mode,
            role,
            asset_ids: assets.iter().map(|asset| asset.id()).collect(),
        });
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_role == Some(role) {
            return Err(DashboardError::Network("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UploadGateway for MockGateway {
    async fn upload_single(
        &self,
        _collection: Collection,
        role: AssetRole,
        asset: &LocalAsset,
    ) -> Result<RemoteAsset> {
        self.record(UploadMode::Single, role, &[asset]).await?;
        Ok(self.next_asset())
    }

    async fn upload_batch(
        &self,
        _collection: Collection,
        role: AssetRole,
        assets: &[LocalAsset],
    ) -> Result<Vec<RemoteAsset>> {
        let refs: Vec<&LocalAsset> = assets.iter().collect();
        self.record(UploadMode::Batch, role, &refs).await?;
        let count = if self.short_batches {
            assets.len().saturating_sub(1)
        } else {
            assets.len()
        };
        Ok((0..count).map(|_| self.next_asset()).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: &'static str,
    pub collection: Collection,
    pub id: Option<String>,
    pub payload: Option<Value>,
}

#[derive(Default)]
pub struct MockContentApi {
    calls: Mutex<Vec<ApiCall>>,
    rejection: Option<(u16, Option<String>)>,
    full: HashMap<String, Value>,
    items: Vec<Value>,
}

impl MockContentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, status: u16, message: Option<&str>) -> Self {
        self.rejection = Some((status, message.map(|m| m.to_string())));
        self
    }

    pub fn with_full(mut self, id: &str, full: Value) -> Self {
        self.full.insert(id.to_string(), full);
        self
    }

    pub fn with_items(mut self, items: Vec<Value>) -> Self {
        self.items = items;
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|call| call.method == method).count()
    }

    fn record(
        &self,
        method: &'static str,
        collection: Collection,
        id: Option<&str>,
        payload: Option<Value>,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(ApiCall {
            method,
            collection,
            id: id.map(|id| id.to_string()),
            payload,
        });
        match &self.rejection {
            Some((status, message)) => Err(DashboardError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentApi for MockContentApi {
    async fn list(&self, collection: Collection, query: &ListQuery) -> Result<Page<Value>> {
        self.record("list", collection, None, None)?;
        Ok(Page {
            items: self.items.clone(),
            total: self.items.len() as u64,
            pages: 1,
            current_page: query.page,
            page_size: Some(query.size),
        })
    }

    async fn fetch_full(&self, collection: Collection, id: &str) -> Result<Value> {
        self.record("fetch_full", collection, Some(id), None)?;
        self.full
            .get(id)
            .cloned()
            .ok_or_else(|| DashboardError::NotFound(id.to_string()))
    }

    async fn create(&self, collection: Collection, payload: Value) -> Result<Value> {
        self.record("create", collection, None, Some(payload))?;
        Ok(json!({"id": "new-1"}))
    }

    async fn update(&self, collection: Collection, id: &str, payload: Value) -> Result<Value> {
        self.record("update", collection, Some(id), Some(payload))?;
        Ok(json!({"id": id}))
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        self.record("delete", collection, Some(id), None)
    }
}

pub fn persisted_image(id: &str) -> MediaReference {
    MediaReference::persisted(id, format!("https://cdn.test/{}.png", id))
}

/// A blog that passes the default rules, with every image already stored.
pub fn valid_blog() -> BlogDraft {
    let mut draft = BlogDraft {
        title: "Into the Mara".to_string(),
        author: "Wanjiru".to_string(),
        content: "A week among the herds of the Maasai Mara.".to_string(),
        cover_image: MediaSlot::from(persisted_image("cover")),
        ..BlogDraft::default()
    };
    draft.sections.append(Section {
        title: "Day one".to_string(),
        content: "Landed at Wilson airport and drove south.".to_string(),
        image: MediaSlot::Empty,
    });
    draft
}

/// An itinerary that passes the default rules, with every image already stored.
pub fn valid_itinerary() -> ItineraryDraft {
    let mut draft = ItineraryDraft {
        title: "Serengeti Classic".to_string(),
        overview: "Seven days across the northern circuit parks.".to_string(),
        duration: 7,
        price: 2500.0,
        discount: 10,
        arrival_city: "Arusha".to_string(),
        departure_city: "Kilimanjaro".to_string(),
        location: "Tanzania".to_string(),
        accommodation: "Lodge".to_string(),
        map: MediaSlot::from(persisted_image("map")),
        gallery_images: vec![persisted_image("g1")],
        tags: vec!["wildlife".to_string()],
        cost_inclusive: vec!["Park fees".to_string()],
        cost_exclusive: vec!["Flights".to_string()],
        ..ItineraryDraft::default()
    };
    draft.days.append(Day {
        title: "Arrival".to_string(),
        details: "Pickup and transfer to the lodge.".to_string(),
        images: vec![persisted_image("d1")],
        hotel: Hotel {
            name: "Arusha Lodge".to_string(),
            url: "https://lodge.example".to_string(),
            images: vec![persisted_image("h1")],
        },
        ..Day::default()
    });
    draft
}
