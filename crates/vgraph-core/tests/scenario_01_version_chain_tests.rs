//! Scenario 1: version chains, single head, delete and restore
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{create_keyed, set_property};
use serde_json::json;
use vgraph_core::gateway::{self, DeleteRequest, RestoreRequest};
use vgraph_core::{GraphError, NoopJournal, VersionStore};

#[test]
fn test_scenario_01_create_update_history_round_trip() {
    // GIVEN an object with version 1
    let mut store = VersionStore::new();
    let v1 = create_keyed(&mut store, "Person", "ada", None);

    // WHEN it is updated twice
    let v2 = set_property(&mut store, &v1.canonical_id, None, "born", json!(1815));
    let v3 = set_property(&mut store, &v2.id, None, "died", json!(1852));

    // THEN history has three versions in order, each superseding the previous
    let history = store.get_history(&v1.canonical_id).unwrap();
    let ids: Vec<&str> = history.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec![v1.id.as_str(), v2.id.as_str(), v3.id.as_str()]);
    assert_eq!(history[1].supersedes_id.as_deref(), Some(v1.id.as_str()));
    assert_eq!(history[2].supersedes_id.as_deref(), Some(v2.id.as_str()));
    let versions: Vec<u64> = history.iter().map(|v| v.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);

    // AND the head carries both properties and the original key
    let head = store.get_head(&v1.canonical_id, None).unwrap();
    assert_eq!(head.id, v3.id);
    assert_eq!(head.content.properties.get("born"), Some(&json!(1815)));
    assert_eq!(head.content.properties.get("died"), Some(&json!(1852)));
    assert_eq!(head.key(), Some("ada"));
}

#[test]
fn test_scenario_01_old_versions_are_never_mutated() {
    let mut store = VersionStore::new();
    let v1 = create_keyed(&mut store, "Person", "grace", None);
    set_property(&mut store, &v1.canonical_id, None, "name", json!("Grace H."));

    let stored = store.get_version(&v1.id).unwrap();
    assert_eq!(stored, &v1);
}

#[test]
fn test_scenario_01_exactly_one_head_per_branch() {
    let mut store = VersionStore::new();
    let v1 = create_keyed(&mut store, "Person", "linus", None);
    for i in 0..5 {
        set_property(&mut store, &v1.canonical_id, None, "rev", json!(i));
    }

    // Only the latest version is the head; every other version is superseded
    let history = store.get_history(&v1.canonical_id).unwrap();
    let head = store.get_head(&v1.canonical_id, None).unwrap();
    let superseded: Vec<&str> = history
        .iter()
        .filter_map(|v| v.supersedes_id.as_deref())
        .collect();
    let unsuperseded: Vec<&str> = history
        .iter()
        .map(|v| v.id.as_str())
        .filter(|id| !superseded.contains(id))
        .collect();
    assert_eq!(unsuperseded, vec![head.id.as_str()]);
}

#[test]
fn test_scenario_01_delete_then_restore_yields_new_version() {
    // GIVEN a live object
    let mut store = VersionStore::new();
    let v1 = create_keyed(&mut store, "Doc", "readme", None);

    // WHEN it is deleted and then restored
    let tombstone = gateway::delete_object(
        &mut store,
        &NoopJournal,
        &v1.canonical_id,
        DeleteRequest::default(),
    )
    .unwrap();
    assert!(matches!(
        gateway::get_object(&store, &v1.canonical_id, None),
        Err(GraphError::NotFound { .. })
    ));
    let restored = gateway::restore_object(
        &mut store,
        &NoopJournal,
        &v1.canonical_id,
        RestoreRequest::default(),
    )
    .unwrap();

    // THEN the restored head is a new version after the tombstone
    assert_ne!(restored.id, v1.id);
    assert_eq!(restored.version, 3);
    assert_eq!(restored.supersedes_id.as_deref(), Some(tombstone.id.as_str()));
    assert!(restored.is_live());
    assert_eq!(restored.content, v1.content);

    // AND history keeps the tombstone
    let history = store.get_history(&v1.canonical_id).unwrap();
    assert_eq!(history.len(), 3);
    assert!(history[1].is_deleted());
    assert_eq!(
        gateway::get_object(&store, &v1.canonical_id, None).unwrap().id,
        restored.id
    );
}

#[test]
fn test_scenario_01_restore_to_key_now_in_use() {
    let mut store = VersionStore::new();
    let original = create_keyed(&mut store, "Doc", "shared", None);
    gateway::delete_object(
        &mut store,
        &NoopJournal,
        &original.canonical_id,
        DeleteRequest::default(),
    )
    .unwrap();
    let replacement = create_keyed(&mut store, "Doc", "shared", None);

    let err = gateway::restore_object(
        &mut store,
        &NoopJournal,
        &original.canonical_id,
        RestoreRequest::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        GraphError::KeyConflict {
            entity_type: "Doc".into(),
            key: "shared".into(),
            branch: "main".into(),
            existing_id: replacement.canonical_id.clone(),
        }
    );
}
