use super::{
    apply_common_patch, ensure_key_free, live_head, resolve_target, restore_tip, revise_head,
    tombstone_head, validate_key, validate_labels, validate_type, DeleteRequest,
    CreateObjectRequest, RestoreRequest, UpdateObjectRequest,
};
use crate::errors::Result;
use crate::model::{branch_key, normalize_branch_id, EntityContent, EntityKind, EntityVersion};
use crate::store::{VersionDraft, VersionJournal, VersionStore};

/// Create a new object (version 1 of a fresh canonical id)
///
/// # Errors
/// * `Validation` - empty type, empty key or blank label
/// * `BranchNotFound` - unknown branch
/// * `KeyConflict` - key already held by a live object of the same type
/// * `Persistence` - journal failure
pub fn create_object(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    req: CreateObjectRequest,
) -> Result<EntityVersion> {
    let mut content = EntityContent::object(validate_type(&req.entity_type)?);
    content.key = validate_key(req.key)?;
    content.status = req.status;
    if let Some(properties) = req.properties {
        content.properties = properties.into();
    }
    if let Some(labels) = validate_labels(req.labels)? {
        content.labels = labels;
    }

    let branch_id = normalize_branch_id(req.branch_id);
    let branch = branch_key(branch_id.as_deref());
    store.require_branch(branch)?;
    ensure_key_free(store, &content, branch, None)?;

    store.commit(journal, VersionDraft::create(branch_id, content))
}

/// Live head of an object addressed by canonical or version id
///
/// # Errors
/// * `NotFound` - unknown id, deleted object, or id of a relationship
/// * `BranchNotFound` - unknown branch
pub fn get_object<'a>(
    store: &'a VersionStore,
    id: &str,
    branch_id: Option<String>,
) -> Result<&'a EntityVersion> {
    let target = resolve_target(store, id, branch_id)?;
    live_head(store, &target, EntityKind::Object)
}

/// Patch an object: properties merge, labels replace, status overwrites
///
/// # Errors
/// * `NotFound` - no live head
/// * `VersionConflict` - `expected_head_id` is stale
/// * `Validation` - blank label
pub fn update_object(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    id: &str,
    req: UpdateObjectRequest,
) -> Result<EntityVersion> {
    let labels = validate_labels(req.labels)?;
    let target = resolve_target(store, id, req.branch_id)?;
    let status = req.status;
    let properties = req.properties;
    revise_head(
        store,
        journal,
        target,
        EntityKind::Object,
        req.expected_head_id,
        |content| apply_common_patch(content, status, properties.as_ref(), labels),
    )
}

/// Tombstone an object
///
/// # Errors
/// * `NotFound` - no live head (absent or already deleted)
/// * `VersionConflict` - `expected_head_id` is stale
pub fn delete_object(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    id: &str,
    req: DeleteRequest,
) -> Result<EntityVersion> {
    let target = resolve_target(store, id, req.branch_id)?;
    tombstone_head(store, journal, target, EntityKind::Object, req.expected_head_id)
}

/// Bring a deleted object back as a new live version
///
/// # Errors
/// * `Validation` - the object is not deleted
/// * `KeyConflict` - its key was taken while it was deleted
/// * `NotFound` - no version visible on the branch
pub fn restore_object(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    id: &str,
    req: RestoreRequest,
) -> Result<EntityVersion> {
    let target = resolve_target(store, id, req.branch_id)?;
    restore_tip(store, journal, target, EntityKind::Object, req.expected_head_id)
}
