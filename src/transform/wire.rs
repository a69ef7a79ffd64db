//! Backend schema: outgoing payloads and the `/full` representation used
//! to hydrate update forms.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPayload {
    pub image_public_id: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPayload {
    pub item: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionPayload {
    pub title: String,
    pub content: String,
    pub image: Option<AssetPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogPayload {
    pub title: String,
    pub content: String,
    pub author: String,
    pub image: Option<AssetPayload>,
    pub sections: Vec<SectionPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelPayload {
    pub name: String,
    pub url: String,
    pub images: Vec<AssetPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPayload {
    pub day_number: u32,
    pub title: String,
    pub details: String,
    pub images: Vec<AssetPayload>,
    pub hotel_detail: HotelPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItineraryPayload {
    pub title: String,
    pub overview: String,
    pub duration: u32,
    pub price: f64,
    pub discount: u8,
    pub arrival_city: String,
    pub departure_city: String,
    pub location: String,
    pub accommodation: String,
    pub map: Option<AssetPayload>,
    pub images: Vec<AssetPayload>,
    pub tags: Vec<ItemPayload>,
    pub cost_inclusive: Vec<ItemPayload>,
    pub cost_exclusive: Vec<ItemPayload>,
    pub days: Vec<DayPayload>,
}

/// Media as it appears in full representations and draft files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireAsset {
    Flat {
        image_public_id: String,
        image_url: String,
    },
    Nested {
        image: NestedAsset,
    },
    /// Local file reference, only found in draft files loaded from disk.
    Local {
        file: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NestedAsset {
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireItem {
    Item { item: String },
    Named { name: String },
    Plain(String),
}

impl WireItem {
    pub fn into_text(self) -> String {
        match self {
            WireItem::Item { item } => item,
            WireItem::Named { name } => name,
            WireItem::Plain(text) => text,
        }
    }
}

/// A string list sent either as items or as one comma separated string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireItems {
    Joined(String),
    List(Vec<WireItem>),
}

impl Default for WireItems {
    fn default() -> Self {
        WireItems::List(Vec::new())
    }
}

impl WireItems {
    pub fn into_texts(self) -> Vec<String> {
        match self {
            WireItems::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            WireItems::List(items) => items.into_iter().map(WireItem::into_text).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SectionFull {
    pub title: String,
    pub content: String,
    pub image: Option<WireAsset>,
    pub image_public_id: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlogFull {
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    pub content: String,
    pub image: Option<WireAsset>,
    pub image_public_id: Option<String>,
    pub image_url: Option<String>,
    pub sections: Vec<SectionFull>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HotelFull {
    pub name: String,
    pub url: String,
    pub images: Vec<WireAsset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DayFull {
    #[serde(alias = "day")]
    pub day_number: Option<u32>,
    pub title: String,
    pub details: String,
    pub images: Vec<WireAsset>,
    #[serde(alias = "hotel")]
    pub hotel_detail: HotelFull,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItineraryFull {
    pub id: Option<String>,
    pub title: String,
    pub overview: String,
    pub duration: u32,
    pub price: f64,
    pub discount: u8,
    pub arrival_city: String,
    pub departure_city: String,
    pub location: String,
    pub accommodation: String,
    pub map: Option<WireAsset>,
    #[serde(alias = "gallery_images")]
    pub images: Vec<WireAsset>,
    pub tags: WireItems,
    pub cost_inclusive: Vec<WireItem>,
    pub cost_exclusive: Vec<WireItem>,
    pub days: Vec<DayFull>,
}
