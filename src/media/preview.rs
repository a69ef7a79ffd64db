use super::{Blob, LocalAsset};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, Weak};
use uuid::Uuid;

/// Tracks preview URLs handed out for pending assets of one form.
///
/// Every allocation is paired with a [`PreviewUrl`] guard; the entry is
/// released when the last clone of the owning [`LocalAsset`] is dropped.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: Mutex<HashSet<Uuid>>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wraps a raw blob as a pending asset with a freshly allocated preview.
    pub fn attach(self: &Arc<Self>, blob: Blob) -> LocalAsset {
        let id = Uuid::new_v4();
        if let Ok(mut live) = self.live.lock() {
            live.insert(id);
        }
        let preview = PreviewUrl {
            id,
            url: format!("blob:safari-admin/{}", id),
            registry: Arc::downgrade(self),
        };
        tracing::debug!("Allocated preview {} for {}", preview.url, blob.file_name());
        LocalAsset::new(blob, Arc::new(preview))
    }

    /// Number of previews not yet released.
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    fn release(&self, id: &Uuid) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(id);
        }
    }
}

#[derive(Debug)]
pub struct PreviewUrl {
    id: Uuid,
    url: String,
    registry: Weak<PreviewRegistry>,
}

impl PreviewUrl {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.release(&self.id);
            tracing::trace!("Released preview {}", self.url);
        }
    }
}
