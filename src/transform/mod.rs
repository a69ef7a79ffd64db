mod blog;
mod itinerary;
pub mod wire;

pub use wire::{AssetPayload, BlogPayload, ItemPayload, ItineraryPayload, WireAsset};

use crate::error::{DashboardError, Result};
use crate::media::{AssetRole, Blob, MediaReference, MediaSlot, PreviewRegistry, RemoteAsset};
use crate::models::{Entity, MediaPath};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Serialises a resolved draft into the JSON body sent to the content API.
pub fn to_wire<T: Entity>(draft: &T) -> Result<Value> {
    let payload = draft.to_payload()?;
    Ok(serde_json::to_value(payload)?)
}

/// Keeps only the top-level keys of `current` whose value differs from
/// `baseline`. Non-object inputs are returned whole.
pub fn changed_fields(current: &Value, baseline: &Value) -> Value {
    let (Some(current_map), Some(baseline_map)) = (current.as_object(), baseline.as_object())
    else {
        return current.clone();
    };

    let changed: Map<String, Value> = current_map
        .iter()
        .filter(|(key, value)| baseline_map.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(changed)
}

fn reference_payload(reference: &MediaReference, path: &MediaPath) -> Result<AssetPayload> {
    match reference {
        MediaReference::Persisted(remote) => Ok(AssetPayload {
            image_public_id: remote.asset_id.clone(),
            image_url: remote.url.clone(),
        }),
        MediaReference::Pending { .. } => Err(DashboardError::Transform(format!(
            "unresolved media at {}",
            path
        ))),
    }
}

pub(crate) fn slot_payload(slot: &MediaSlot, path: &MediaPath) -> Result<Option<AssetPayload>> {
    match slot {
        MediaSlot::Empty => Ok(None),
        MediaSlot::Filled(reference) => reference_payload(reference, path).map(Some),
    }
}

pub(crate) fn list_payload(items: &[MediaReference], path: &MediaPath) -> Result<Vec<AssetPayload>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| reference_payload(item, &path.index(i)))
        .collect()
}

pub(crate) fn items_payload(items: &[String]) -> Vec<ItemPayload> {
    items
        .iter()
        .map(|item| ItemPayload { item: item.clone() })
        .collect()
}

fn hydrate_reference(
    asset: WireAsset,
    role: AssetRole,
    previews: &Arc<PreviewRegistry>,
) -> Option<MediaReference> {
    let (asset_id, url) = match asset {
        WireAsset::Flat {
            image_public_id,
            image_url,
        } => (image_public_id, image_url),
        WireAsset::Nested { image } => (image.public_id, image.url),
        WireAsset::Local { file } => {
            return Some(MediaReference::pending(previews.attach(Blob::File(file)), role));
        }
    };

    if asset_id.trim().is_empty() || url.trim().is_empty() {
        return None;
    }
    Some(MediaReference::Persisted(RemoteAsset { asset_id, url }))
}

pub(crate) fn hydrate_slot(
    asset: Option<WireAsset>,
    role: AssetRole,
    previews: &Arc<PreviewRegistry>,
) -> MediaSlot {
    asset
        .and_then(|asset| hydrate_reference(asset, role, previews))
        .map(MediaSlot::Filled)
        .unwrap_or_default()
}

pub(crate) fn hydrate_list(
    assets: Vec<WireAsset>,
    role: AssetRole,
    previews: &Arc<PreviewRegistry>,
) -> Vec<MediaReference> {
    assets
        .into_iter()
        .filter_map(|asset| hydrate_reference(asset, role, previews))
        .collect()
}

/// Older blog records carry the image as two loose top-level keys.
pub(crate) fn loose_pair(
    nested: Option<WireAsset>,
    public_id: Option<String>,
    url: Option<String>,
) -> Option<WireAsset> {
    nested.or(match (public_id, url) {
        (Some(image_public_id), Some(image_url)) => Some(WireAsset::Flat {
            image_public_id,
            image_url,
        }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_fields_keeps_only_differences() {
        let baseline = json!({"title": "Old", "author": "Ann", "sections": [1, 2]});
        let current = json!({"title": "New", "author": "Ann", "sections": [1, 2, 3]});
        assert_eq!(
            changed_fields(&current, &baseline),
            json!({"title": "New", "sections": [1, 2, 3]})
        );
    }

    #[test]
    fn test_changed_fields_non_object_baseline() {
        let current = json!({"title": "New"});
        assert_eq!(changed_fields(&current, &Value::Null), current);
    }

    #[test]
    fn test_pending_reference_is_a_transform_error() {
        let previews = PreviewRegistry::new();
        let pending = MediaReference::pending(
            previews.attach(Blob::memory("a.png", vec![1])),
            AssetRole::Gallery,
        );
        let path = MediaPath::root().field("gallery_images");
        let err = list_payload(&[pending], &path).unwrap_err();
        assert!(err.to_string().contains("gallery_images[0]"));
    }

    #[test]
    fn test_blank_persisted_pair_hydrates_empty() {
        let previews = PreviewRegistry::new();
        let slot = hydrate_slot(
            Some(WireAsset::Flat {
                image_public_id: String::new(),
                image_url: String::new(),
            }),
            AssetRole::Cover,
            &previews,
        );
        assert!(slot.is_empty());
    }

    #[test]
    fn test_local_file_hydrates_pending() {
        let previews = PreviewRegistry::new();
        let asset: WireAsset = serde_json::from_value(json!({"file": "/tmp/map.png"})).unwrap();
        let slot = hydrate_slot(Some(asset), AssetRole::Map, &previews);
        assert!(slot.is_pending());
        assert_eq!(previews.live_count(), 1);
    }
}
