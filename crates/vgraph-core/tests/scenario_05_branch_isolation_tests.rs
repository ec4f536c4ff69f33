//! Scenario 5: branch isolation and head resolution
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{branch, create_keyed, set_property};
use serde_json::json;
use vgraph_core::gateway::{self, CreateObjectRequest};
use vgraph_core::search::{self, SearchLimits, SearchQuery};
use vgraph_core::{EntityKind, GraphError, NoopJournal, VersionStore};

#[test]
fn test_scenario_05_branch_write_invisible_on_main() {
    // GIVEN X on main and a branch
    let mut store = VersionStore::new();
    let x = create_keyed(&mut store, "Doc", "x", None);
    let b = branch(&mut store, "feature");

    // WHEN X is updated on the branch
    let on_branch = set_property(&mut store, &x.canonical_id, Some(&b.id), "name", json!("b"));

    // THEN each branch resolves its own head
    assert_eq!(store.get_head(&x.canonical_id, None).unwrap().id, x.id);
    assert_eq!(
        store.get_head(&x.canonical_id, Some(&b.id)).unwrap().id,
        on_branch.id
    );
    assert_eq!(on_branch.branch_id.as_deref(), Some(b.id.as_str()));
}

#[test]
fn test_scenario_05_main_writes_after_fork_are_invisible() {
    let mut store = VersionStore::new();
    let x = create_keyed(&mut store, "Doc", "x", None);
    let b = branch(&mut store, "feature");
    set_property(&mut store, &x.canonical_id, None, "name", json!("later"));

    let seen = store.get_head(&x.canonical_id, Some(&b.id)).unwrap();
    assert_eq!(seen.id, x.id);
}

#[test]
fn test_scenario_05_key_uniqueness_is_per_branch() {
    // GIVEN a key used on main before the fork
    let mut store = VersionStore::new();
    create_keyed(&mut store, "Doc", "k", None);
    let b = branch(&mut store, "feature");

    // THEN the branch inherits the key and rejects a duplicate
    let err = gateway::create_object(
        &mut store,
        &NoopJournal,
        CreateObjectRequest {
            entity_type: "Doc".into(),
            key: Some("k".into()),
            branch_id: Some(b.id.clone()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, GraphError::KeyConflict { .. }));

    // AND a key created only on the branch stays free on main
    create_keyed(&mut store, "Doc", "branch-only", Some(&b.id));
    create_keyed(&mut store, "Doc", "branch-only", None);
}

#[test]
fn test_scenario_05_search_is_branch_scoped() {
    let mut store = VersionStore::new();
    create_keyed(&mut store, "Doc", "shared", None);
    let b = branch(&mut store, "feature");
    create_keyed(&mut store, "Doc", "mine", Some(&b.id));
    create_keyed(&mut store, "Doc", "theirs", None);

    let query = SearchQuery {
        branch_id: Some(b.id.clone()),
        ..Default::default()
    };
    let page = search::search(&store, EntityKind::Object, &query, &SearchLimits::default()).unwrap();
    let keys: Vec<&str> = page.items.iter().filter_map(|v| v.key()).collect();
    assert_eq!(keys, vec!["shared", "mine"]);
}

#[test]
fn test_scenario_05_unknown_branch_is_not_found() {
    let mut store = VersionStore::new();
    let err = gateway::create_object(
        &mut store,
        &NoopJournal,
        CreateObjectRequest {
            entity_type: "Doc".into(),
            branch_id: Some("nope".into()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, GraphError::BranchNotFound { .. }));
}
