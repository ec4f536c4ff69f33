//! Mutation gateway
//!
//! Validates requests, enforces key uniqueness and referential integrity,
//! and turns each accepted mutation into exactly one version commit (two
//! when a relationship inverse is materialized).

pub mod bulk;
pub mod objects;
pub mod relationships;
pub mod requests;

use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub use bulk::{
    bulk_create_objects, bulk_create_relationships, bulk_update_objects,
    bulk_update_relationships, check_batch, BulkItemError, BulkItemReport, BulkItemResult,
    BulkResponse, ConflictReason,
};
pub use objects::{create_object, delete_object, get_object, restore_object, update_object};
pub use relationships::{
    create_relationship, delete_relationship, get_relationship, restore_relationship,
    update_relationship, CreatedRelationship,
};
pub use requests::{
    BulkUpdateObjectItem, BulkUpdateRelationshipItem, CreateObjectRequest,
    CreateRelationshipRequest, DeleteRequest, RestoreRequest, UpdateObjectRequest,
    UpdateRelationshipRequest,
};

use crate::errors::{GraphError, Result};
use crate::model::{branch_key, normalize_branch_id, EntityContent, EntityKind, EntityVersion};
use crate::store::{Precondition, VersionDraft, VersionJournal, VersionStore};

/// Look up the live entity holding a key, the way bulk loaders do after a
/// key race
///
/// # Errors
///
/// Returns `BranchNotFound` for an unknown branch.
pub fn find_by_key<'a>(
    store: &'a VersionStore,
    kind: EntityKind,
    entity_type: &str,
    key: &str,
    branch_id: Option<&str>,
) -> Result<Option<&'a EntityVersion>> {
    let branch = branch_key(branch_id);
    store.require_branch(branch)?;
    Ok(store.find_by_key(kind, entity_type, key, branch))
}

/// Every version of an entity of `kind`, across branches, oldest first
///
/// `id` may be a canonical id or any of its version ids.
///
/// # Errors
///
/// Returns `NotFound` for an unknown id or an id of the other kind.
pub fn history<'a>(
    store: &'a VersionStore,
    id: &str,
    kind: EntityKind,
) -> Result<Vec<&'a EntityVersion>> {
    let not_found = || GraphError::NotFound {
        id: id.to_string(),
        branch: "*".to_string(),
    };
    let (canonical, _) = store.canonical_of(id).ok_or_else(not_found)?;
    let versions = store.get_history(canonical)?;
    match versions.first() {
        Some(first) if first.kind() == kind => Ok(versions),
        _ => Err(not_found()),
    }
}

pub(crate) fn validate_type(entity_type: &str) -> Result<String> {
    let trimmed = entity_type.trim();
    if trimmed.is_empty() {
        return Err(GraphError::validation("type must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_key(key: Option<String>) -> Result<Option<String>> {
    match key {
        Some(k) if k.trim().is_empty() => Err(GraphError::validation("key must not be empty")),
        other => Ok(other),
    }
}

pub(crate) fn validate_labels(labels: Option<Vec<String>>) -> Result<Option<BTreeSet<String>>> {
    let Some(labels) = labels else {
        return Ok(None);
    };
    let mut set = BTreeSet::new();
    for label in labels {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(GraphError::validation("labels must be non-empty strings"));
        }
        set.insert(trimmed.to_string());
    }
    Ok(Some(set))
}

pub(crate) fn validate_weight(weight: Option<f64>) -> Result<Option<f64>> {
    match weight {
        Some(w) if !w.is_finite() => Err(GraphError::validation("weight must be a finite number")),
        other => Ok(other),
    }
}

/// Fail with `KeyConflict` if another live entity holds the key on the branch
pub(crate) fn ensure_key_free(
    store: &VersionStore,
    content: &EntityContent,
    branch: &str,
    canonical_id: Option<&str>,
) -> Result<()> {
    let Some(key) = content.key.as_deref() else {
        return Ok(());
    };
    match store.find_by_key(content.kind, &content.entity_type, key, branch) {
        Some(holder) if Some(holder.canonical_id.as_str()) != canonical_id => {
            Err(GraphError::KeyConflict {
                entity_type: content.entity_type.clone(),
                key: key.to_string(),
                branch: branch.to_string(),
                existing_id: holder.canonical_id.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Fail with `DanglingReference` unless `object_id` is a live object on the branch
pub(crate) fn ensure_live_object(store: &VersionStore, object_id: &str, branch: &str) -> Result<()> {
    match store.resolve_head(object_id, branch) {
        Some(head) if head.kind() == EntityKind::Object => Ok(()),
        _ => Err(GraphError::DanglingReference {
            endpoint_id: object_id.to_string(),
            branch: branch.to_string(),
        }),
    }
}

/// An id-addressed write target: canonical id plus effective branch
pub(crate) struct Target {
    pub canonical_id: String,
    pub branch_id: Option<String>,
}

impl Target {
    pub fn branch(&self) -> &str {
        branch_key(self.branch_id.as_deref())
    }
}

/// Resolve `id` (canonical or version id) and the branch to act on
///
/// An explicit branch wins; otherwise a version id implies the branch it
/// was written on; otherwise main.
pub(crate) fn resolve_target(
    store: &VersionStore,
    id: &str,
    branch_id: Option<String>,
) -> Result<Target> {
    let explicit = normalize_branch_id(branch_id);
    let (canonical, hint) = store.canonical_of(id).ok_or_else(|| GraphError::NotFound {
        id: id.to_string(),
        branch: branch_key(explicit.as_deref()).to_string(),
    })?;
    let target = Target {
        canonical_id: canonical.to_string(),
        branch_id: explicit.or_else(|| hint.map(str::to_string)),
    };
    store.require_branch(target.branch())?;
    Ok(target)
}

/// Live head of the target, which must be of `kind`
pub(crate) fn live_head<'a>(
    store: &'a VersionStore,
    target: &Target,
    kind: EntityKind,
) -> Result<&'a EntityVersion> {
    store
        .resolve_head(&target.canonical_id, target.branch())
        .filter(|head| head.kind() == kind)
        .ok_or_else(|| GraphError::NotFound {
            id: target.canonical_id.clone(),
            branch: target.branch().to_string(),
        })
}

/// Apply a content patch to the live head as one new version
pub(crate) fn revise_head(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    target: Target,
    kind: EntityKind,
    expected_head_id: Option<String>,
    patch: impl FnOnce(&mut EntityContent),
) -> Result<EntityVersion> {
    let head = live_head(store, &target, kind)?;
    let precondition = Precondition::Expect(Some(
        expected_head_id.unwrap_or_else(|| head.id.clone()),
    ));
    let mut content = head.content.clone();
    patch(&mut content);

    store.commit(
        journal,
        VersionDraft::revise(target.canonical_id, target.branch_id, content)
            .expecting(precondition),
    )
}

/// Write a tombstone over the live head
pub(crate) fn tombstone_head(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    target: Target,
    kind: EntityKind,
    expected_head_id: Option<String>,
) -> Result<EntityVersion> {
    let head = live_head(store, &target, kind)?;
    let precondition = Precondition::Expect(Some(
        expected_head_id.unwrap_or_else(|| head.id.clone()),
    ));
    let content = head.content.clone();

    store.commit(
        journal,
        VersionDraft::revise(target.canonical_id, target.branch_id, content)
            .tombstone()
            .expecting(precondition),
    )
}

/// Write a live version over a tombstoned tip
pub(crate) fn restore_tip(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    target: Target,
    kind: EntityKind,
    expected_head_id: Option<String>,
) -> Result<EntityVersion> {
    let branch = target.branch().to_string();
    let tip = store
        .resolve_tip(&target.canonical_id, &branch)
        .filter(|tip| tip.kind() == kind)
        .ok_or_else(|| GraphError::NotFound {
            id: target.canonical_id.clone(),
            branch: branch.clone(),
        })?;
    if tip.is_live() {
        return Err(GraphError::validation(format!(
            "{} is not deleted on branch {}",
            target.canonical_id, branch
        )));
    }

    ensure_key_free(store, &tip.content, &branch, Some(&target.canonical_id))?;
    if let Some((src, dst)) = tip.endpoints() {
        ensure_live_object(store, src, &branch)?;
        ensure_live_object(store, dst, &branch)?;
    }

    let precondition = Precondition::Expect(Some(
        expected_head_id.unwrap_or_else(|| tip.id.clone()),
    ));
    let content = tip.content.clone();

    store.commit(
        journal,
        VersionDraft::revise(target.canonical_id, target.branch_id, content)
            .expecting(precondition),
    )
}

pub(crate) fn apply_common_patch(
    content: &mut EntityContent,
    status: Option<String>,
    properties: Option<&Map<String, Value>>,
    labels: Option<BTreeSet<String>>,
) {
    if let Some(status) = status {
        content.status = Some(status);
    }
    if let Some(patch) = properties {
        content.properties.merge_patch(patch);
    }
    if let Some(labels) = labels {
        content.labels = labels;
    }
}
