use serde_json::{json, Value};
use vgraph_core::gateway::{
    self, CreateObjectRequest, CreateRelationshipRequest, UpdateObjectRequest,
};
use vgraph_core::{Branch, EntityVersion, NoopJournal, VersionStore};

/// Create an object of `entity_type` with a business key
#[allow(dead_code)]
pub fn create_keyed(
    store: &mut VersionStore,
    entity_type: &str,
    key: &str,
    branch_id: Option<&str>,
) -> EntityVersion {
    gateway::create_object(
        store,
        &NoopJournal,
        CreateObjectRequest {
            entity_type: entity_type.to_string(),
            key: Some(key.to_string()),
            properties: json!({ "name": key }).as_object().cloned(),
            branch_id: branch_id.map(str::to_string),
            ..Default::default()
        },
    )
    .expect("create object")
}

/// Set one property on the head of `id`
#[allow(dead_code)]
pub fn set_property(
    store: &mut VersionStore,
    id: &str,
    branch_id: Option<&str>,
    name: &str,
    value: Value,
) -> EntityVersion {
    let mut patch = serde_json::Map::new();
    patch.insert(name.to_string(), value);
    gateway::update_object(
        store,
        &NoopJournal,
        id,
        UpdateObjectRequest {
            properties: Some(patch),
            branch_id: branch_id.map(str::to_string),
            ..Default::default()
        },
    )
    .expect("update object")
}

/// Relationship `src -> dst` of `entity_type`
#[allow(dead_code)]
pub fn link(
    store: &mut VersionStore,
    entity_type: &str,
    src: &str,
    dst: &str,
    branch_id: Option<&str>,
) -> EntityVersion {
    gateway::create_relationship(
        store,
        &NoopJournal,
        CreateRelationshipRequest {
            entity_type: entity_type.to_string(),
            src_id: src.to_string(),
            dst_id: dst.to_string(),
            branch_id: branch_id.map(str::to_string),
            ..Default::default()
        },
    )
    .expect("create relationship")
    .relationship
}

#[allow(dead_code)]
pub fn branch(store: &mut VersionStore, name: &str) -> Branch {
    store
        .create_branch(&NoopJournal, name, None)
        .expect("create branch")
}
