use serde::Serialize;

use super::{
    apply_common_patch, ensure_key_free, ensure_live_object, live_head, resolve_target,
    restore_tip, revise_head, tombstone_head, validate_key, validate_labels, validate_type,
    validate_weight, CreateRelationshipRequest, DeleteRequest, RestoreRequest,
    UpdateRelationshipRequest,
};
use crate::errors::{GraphError, Result};
use crate::model::{branch_key, normalize_branch_id, EntityContent, EntityKind, EntityVersion};
use crate::store::{VersionDraft, VersionJournal, VersionStore};

/// A created relationship plus its materialized inverse, if requested
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRelationship {
    #[serde(flatten)]
    pub relationship: EntityVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse: Option<EntityVersion>,
}

/// Create a relationship between two live objects
///
/// With `inverse_type` a `dst -> src` relationship carrying the same status,
/// properties, labels and weight is written in the same commit as the
/// primary one, pointing back to it through `inverse_of`.
///
/// # Errors
/// * `Validation` - empty type, endpoints or key, blank label, bad weight
/// * `DanglingReference` - an endpoint is not a live object on the branch
/// * `KeyConflict` - key already held on the branch
pub fn create_relationship(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    req: CreateRelationshipRequest,
) -> Result<CreatedRelationship> {
    let entity_type = validate_type(&req.entity_type)?;
    let src_id = req.src_id.trim().to_string();
    let dst_id = req.dst_id.trim().to_string();
    if src_id.is_empty() || dst_id.is_empty() {
        return Err(GraphError::validation("src_id and dst_id are required"));
    }
    let inverse_type = req
        .inverse_type
        .as_deref()
        .map(validate_type)
        .transpose()?;

    let mut content = EntityContent::relationship(entity_type, &src_id, &dst_id);
    content.key = validate_key(req.key)?;
    content.status = req.status;
    content.weight = validate_weight(req.weight)?;
    if let Some(properties) = req.properties {
        content.properties = properties.into();
    }
    if let Some(labels) = validate_labels(req.labels)? {
        content.labels = labels;
    }

    let branch_id = normalize_branch_id(req.branch_id);
    let branch = branch_key(branch_id.as_deref()).to_string();
    store.require_branch(&branch)?;
    ensure_live_object(store, &src_id, &branch)?;
    ensure_live_object(store, &dst_id, &branch)?;
    ensure_key_free(store, &content, &branch, None)?;

    let inverse_content = inverse_type.map(|t| {
        let mut inverse = EntityContent::relationship(t, &dst_id, &src_id);
        inverse.status = content.status.clone();
        inverse.properties = content.properties.clone();
        inverse.labels = content.labels.clone();
        inverse.weight = content.weight;
        inverse
    });

    let primary = VersionDraft::create(branch_id.clone(), content);
    match inverse_content {
        Some(mut inverse) => {
            let (relationship, inverse) = store.commit_linked(journal, primary, |rel| {
                inverse.inverse_of = Some(rel.canonical_id.clone());
                VersionDraft::create(branch_id, inverse)
            })?;
            Ok(CreatedRelationship {
                relationship,
                inverse: Some(inverse),
            })
        }
        None => Ok(CreatedRelationship {
            relationship: store.commit(journal, primary)?,
            inverse: None,
        }),
    }
}

/// Live head of a relationship addressed by canonical or version id
///
/// # Errors
/// * `NotFound` - unknown id, deleted relationship, or id of an object
pub fn get_relationship<'a>(
    store: &'a VersionStore,
    id: &str,
    branch_id: Option<String>,
) -> Result<&'a EntityVersion> {
    let target = resolve_target(store, id, branch_id)?;
    live_head(store, &target, EntityKind::Relationship)
}

/// Patch a relationship's weight, status, properties or labels
///
/// # Errors
/// * `NotFound` - no live head
/// * `VersionConflict` - `expected_head_id` is stale
/// * `Validation` - blank label or non-finite weight
pub fn update_relationship(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    id: &str,
    req: UpdateRelationshipRequest,
) -> Result<EntityVersion> {
    let labels = validate_labels(req.labels)?;
    let weight = validate_weight(req.weight)?;
    let target = resolve_target(store, id, req.branch_id)?;
    let status = req.status;
    let properties = req.properties;
    revise_head(
        store,
        journal,
        target,
        EntityKind::Relationship,
        req.expected_head_id,
        |content| {
            apply_common_patch(content, status, properties.as_ref(), labels);
            if weight.is_some() {
                content.weight = weight;
            }
        },
    )
}

/// Tombstone a relationship
///
/// # Errors
/// * `NotFound` - no live head
/// * `VersionConflict` - `expected_head_id` is stale
pub fn delete_relationship(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    id: &str,
    req: DeleteRequest,
) -> Result<EntityVersion> {
    let target = resolve_target(store, id, req.branch_id)?;
    tombstone_head(
        store,
        journal,
        target,
        EntityKind::Relationship,
        req.expected_head_id,
    )
}

/// Restore a deleted relationship; both endpoints must be live again
///
/// # Errors
/// * `Validation` - the relationship is not deleted
/// * `DanglingReference` - an endpoint is no longer live
/// * `KeyConflict` - its key was taken meanwhile
pub fn restore_relationship(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    id: &str,
    req: RestoreRequest,
) -> Result<EntityVersion> {
    let target = resolve_target(store, id, req.branch_id)?;
    restore_tip(
        store,
        journal,
        target,
        EntityKind::Relationship,
        req.expected_head_id,
    )
}
