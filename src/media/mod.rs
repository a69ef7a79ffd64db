pub mod preview;

pub use preview::{PreviewRegistry, PreviewUrl};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Upload role of a media slot. Decides which gateway call a pending asset
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    Cover,
    Gallery,
    Map,
}

impl AssetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetRole::Cover => "cover",
            AssetRole::Gallery => "gallery",
            AssetRole::Map => "map",
        }
    }
}

/// Raw binary handle of a user-selected file.
#[derive(Debug, Clone)]
pub enum Blob {
    File(PathBuf),
    Memory {
        file_name: String,
        content_type: Option<String>,
        data: Arc<[u8]>,
    },
}

impl Blob {
    pub fn memory(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Blob::Memory {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            Blob::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "upload".to_string()),
            Blob::Memory { file_name, .. } => file_name.clone(),
        }
    }

    pub fn content_type(&self) -> String {
        match self {
            Blob::Memory {
                content_type: Some(content_type),
                ..
            } => content_type.clone(),
            _ => guess_content_type(Path::new(&self.file_name())).to_string(),
        }
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        match self {
            Blob::File(path) => Ok(tokio::fs::read(path).await?),
            Blob::Memory { data, .. } => Ok(data.to_vec()),
        }
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// A local file waiting to be uploaded. Clones share one preview handle.
#[derive(Debug, Clone)]
pub struct LocalAsset {
    blob: Blob,
    preview: Arc<PreviewUrl>,
}

impl LocalAsset {
    pub(crate) fn new(blob: Blob, preview: Arc<PreviewUrl>) -> Self {
        Self { blob, preview }
    }

    pub fn id(&self) -> Uuid {
        self.preview.id()
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    pub fn preview_url(&self) -> &str {
        self.preview.as_str()
    }
}

impl PartialEq for LocalAsset {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

/// A durably stored media object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    pub asset_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaReference {
    Pending { asset: LocalAsset, role: AssetRole },
    Persisted(RemoteAsset),
}

impl MediaReference {
    pub fn pending(asset: LocalAsset, role: AssetRole) -> Self {
        MediaReference::Pending { asset, role }
    }

    pub fn persisted(asset_id: impl Into<String>, url: impl Into<String>) -> Self {
        MediaReference::Persisted(RemoteAsset {
            asset_id: asset_id.into(),
            url: url.into(),
        })
    }

    pub fn is_pending(&self) -> bool {
        match self {
            MediaReference::Pending { .. } => true,
            MediaReference::Persisted(_) => false,
        }
    }

    pub fn display_url(&self) -> &str {
        match self {
            MediaReference::Pending { asset, .. } => asset.preview_url(),
            MediaReference::Persisted(remote) => &remote.url,
        }
    }
}

/// Single-valued media field; `Empty` is distinct from both reference kinds.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MediaSlot {
    #[default]
    Empty,
    Filled(MediaReference),
}

impl MediaSlot {
    pub fn is_pending(&self) -> bool {
        match self {
            MediaSlot::Empty => false,
            MediaSlot::Filled(reference) => reference.is_pending(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MediaSlot::Empty)
    }

    pub fn display_url(&self) -> Option<&str> {
        match self {
            MediaSlot::Empty => None,
            MediaSlot::Filled(reference) => Some(reference.display_url()),
        }
    }

    pub fn reference(&self) -> Option<&MediaReference> {
        match self {
            MediaSlot::Empty => None,
            MediaSlot::Filled(reference) => Some(reference),
        }
    }

    /// Stores `reference`, returning the previous one. Dropping the returned
    /// value releases its preview.
    pub fn set(&mut self, reference: MediaReference) -> Option<MediaReference> {
        match std::mem::replace(self, MediaSlot::Filled(reference)) {
            MediaSlot::Empty => None,
            MediaSlot::Filled(previous) => Some(previous),
        }
    }

    pub fn clear(&mut self) -> Option<MediaReference> {
        match std::mem::take(self) {
            MediaSlot::Empty => None,
            MediaSlot::Filled(previous) => Some(previous),
        }
    }
}

impl From<MediaReference> for MediaSlot {
    fn from(reference: MediaReference) -> Self {
        MediaSlot::Filled(reference)
    }
}
