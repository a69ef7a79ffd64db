//! Upload resolution: replaces every pending media reference of a draft
//! with the persisted asset returned by the upload gateway.

use crate::api::UploadGateway;
use crate::error::{DashboardError, Result};
use crate::media::{AssetRole, LocalAsset, MediaReference, MediaSlot, RemoteAsset};
use crate::models::{Collection, Entity, MediaPath, MediaTree, SlotMut, SlotRef};
use futures::future::try_join_all;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// One asset, one call (cover image, map, section image).
    Single,
    /// All pending entries of one list and role in a single call.
    Batch,
}

/// One gateway call worth of pending assets.
#[derive(Debug, Clone)]
pub struct UploadGroup {
    pub path: MediaPath,
    pub role: AssetRole,
    pub mode: UploadMode,
    /// Position of each asset inside its list; `None` for single slots.
    pub positions: Vec<Option<usize>>,
    pub assets: Vec<LocalAsset>,
}

/// Walks `tree` depth-first and groups its pending assets into gateway calls.
pub fn plan_uploads<T: MediaTree>(tree: &T) -> Vec<UploadGroup> {
    let mut groups = Vec::new();

    for field in tree.media_fields() {
        match field.slot {
            SlotRef::Single(MediaSlot::Filled(MediaReference::Pending { asset, role })) => {
                groups.push(UploadGroup {
                    path: field.path,
                    role: *role,
                    mode: UploadMode::Single,
                    positions: vec![None],
                    assets: vec![asset.clone()],
                });
            }
            SlotRef::Single(_) => {}
            SlotRef::List(items) => {
                let mut by_role: Vec<UploadGroup> = Vec::new();
                for (position, item) in items.iter().enumerate() {
                    let MediaReference::Pending { asset, role } = item else {
                        continue;
                    };
                    match by_role.iter_mut().find(|group| group.role == *role) {
                        Some(group) => {
                            group.positions.push(Some(position));
                            group.assets.push(asset.clone());
                        }
                        None => by_role.push(UploadGroup {
                            path: field.path.clone(),
                            role: *role,
                            mode: UploadMode::Batch,
                            positions: vec![Some(position)],
                            assets: vec![asset.clone()],
                        }),
                    }
                }
                groups.extend(by_role);
            }
        }
    }

    groups
}

/// Uploads every pending asset of `tree` and returns a resolved copy.
///
/// Groups are uploaded concurrently. If any of them fails the whole call
/// fails and nothing is substituted; `tree` itself is never modified.
pub async fn resolve<T: Entity>(tree: &T, gateway: &dyn UploadGateway) -> Result<T> {
    let groups = plan_uploads(tree);
    if groups.is_empty() {
        tracing::debug!("No pending media in {} draft", T::COLLECTION.singular());
        return Ok(tree.clone());
    }

    let pending: usize = groups.iter().map(|group| group.assets.len()).sum();
    tracing::info!(
        "Resolving {} pending assets in {} upload groups",
        pending,
        groups.len()
    );

    let uploads = groups
        .iter()
        .map(|group| upload_group(gateway, T::COLLECTION, group));
    let results = try_join_all(uploads).await?;

    let mut resolved = tree.clone();
    splice(&mut resolved, groups, results)?;
    Ok(resolved)
}

async fn upload_group(
    gateway: &dyn UploadGateway,
    collection: Collection,
    group: &UploadGroup,
) -> Result<Vec<RemoteAsset>> {
    let result = match group.mode {
        UploadMode::Single => match group.assets.first() {
            Some(asset) => gateway
                .upload_single(collection, group.role, asset)
                .await
                .map(|remote| vec![remote]),
            None => Ok(Vec::new()),
        },
        UploadMode::Batch => gateway
            .upload_batch(collection, group.role, &group.assets)
            .await,
    };

    let uploaded = result.map_err(|e| {
        tracing::error!("Upload for {} failed: {}", group.path, e);
        match e {
            DashboardError::Upload(_) => e,
            other => DashboardError::Upload(format!("{}: {}", group.path, other)),
        }
    })?;

    if uploaded.len() != group.assets.len() {
        return Err(DashboardError::Upload(format!(
            "{}: gateway returned {} assets for {} uploads",
            group.path,
            uploaded.len(),
            group.assets.len()
        )));
    }
    Ok(uploaded)
}

fn splice<T: MediaTree>(
    tree: &mut T,
    groups: Vec<UploadGroup>,
    results: Vec<Vec<RemoteAsset>>,
) -> Result<()> {
    let mut by_path: HashMap<MediaPath, Vec<(Option<usize>, RemoteAsset)>> = HashMap::new();
    for (group, uploaded) in groups.into_iter().zip(results) {
        by_path
            .entry(group.path)
            .or_default()
            .extend(group.positions.into_iter().zip(uploaded));
    }

    for field in tree.media_fields_mut() {
        let Some(entries) = by_path.remove(&field.path) else {
            continue;
        };
        match field.slot {
            SlotMut::Single(slot) => {
                for (_, remote) in entries {
                    *slot = MediaSlot::Filled(MediaReference::Persisted(remote));
                }
            }
            SlotMut::List(items) => {
                for (position, remote) in entries {
                    let item = position.and_then(|p| items.get_mut(p)).ok_or_else(|| {
                        DashboardError::Logic(format!(
                            "upload position {:?} missing from {}",
                            position, field.path
                        ))
                    })?;
                    *item = MediaReference::Persisted(remote);
                }
            }
        }
    }

    if !by_path.is_empty() {
        return Err(DashboardError::Logic(format!(
            "{} upload results had no matching slot",
            by_path.len()
        )));
    }
    Ok(())
}
