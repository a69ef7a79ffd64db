mod blog;
pub mod field_array;
mod itinerary;
mod path;

pub use blog::{BlogDraft, Section};
pub use field_array::{ArrayItem, FieldArray, RowKey};
pub use itinerary::{Day, Hotel, ItineraryDraft};
pub use path::{MediaPath, Segment};

use crate::error::Result;
use crate::media::{MediaReference, MediaSlot, PreviewRegistry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Remote collection an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Blogs,
    Itineraries,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Blogs => "blogs",
            Collection::Itineraries => "itineraries",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Collection::Blogs => "blog",
            Collection::Itineraries => "itinerary",
        }
    }

    /// Dashboard route of the collection's list view.
    pub fn list_route(&self) -> String {
        format!("/{}", self.as_str())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = crate::DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "blogs" | "blog" => Ok(Collection::Blogs),
            "itineraries" | "itinerary" => Ok(Collection::Itineraries),
            other => Err(crate::DashboardError::InvalidArgument(format!(
                "Unknown collection: {}",
                other
            ))),
        }
    }
}

pub enum SlotRef<'a> {
    Single(&'a MediaSlot),
    List(&'a [MediaReference]),
}

pub enum SlotMut<'a> {
    Single(&'a mut MediaSlot),
    List(&'a mut Vec<MediaReference>),
}

/// A media-bearing field together with its coordinate in the tree.
pub struct MediaField<S> {
    pub path: MediaPath,
    pub slot: S,
}

/// Depth-first view over every media slot of a tree.
///
/// Both methods must yield the same paths in the same order.
pub trait MediaTree {
    fn media_fields(&self) -> Vec<MediaField<SlotRef<'_>>>;

    fn media_fields_mut(&mut self) -> Vec<MediaField<SlotMut<'_>>>;

    fn pending_count(&self) -> usize {
        self.media_fields()
            .iter()
            .map(|field| match &field.slot {
                SlotRef::Single(slot) => usize::from(slot.is_pending()),
                SlotRef::List(items) => items.iter().filter(|item| item.is_pending()).count(),
            })
            .sum()
    }
}

/// A root draft entity: its media layout, wire payload and hydration source.
pub trait Entity: MediaTree + Clone + Default + Send + Sync + 'static {
    const COLLECTION: Collection;

    type Payload: Serialize + Send + Sync;
    type Full: DeserializeOwned + Send;

    /// Maps a fully resolved tree to the backend schema. Fails if any
    /// pending reference remains.
    fn to_payload(&self) -> Result<Self::Payload>;

    /// Builds a draft from the backend's full representation.
    fn hydrate(full: Self::Full, previews: &Arc<PreviewRegistry>) -> Result<Self>;
}
