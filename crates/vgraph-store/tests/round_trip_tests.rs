// Integration tests: journal writes followed by hydration rebuild the same store
#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use vgraph_core::errors::VgErrorKind;
use vgraph_core::gateway::{self, CreateObjectRequest, CreateRelationshipRequest, DeleteRequest};
use vgraph_core::merge::{merge_branches, MergeRequest};
use vgraph_core::{GraphError, VersionStore};
use vgraph_store::{hydrate, SqliteJournal, SqliteRepo};

fn keyed(key: &str, branch_id: Option<&str>) -> CreateObjectRequest {
    CreateObjectRequest {
        entity_type: "Person".into(),
        key: Some(key.into()),
        properties: json!({ "name": key }).as_object().cloned(),
        labels: Some(vec!["seed".into()]),
        branch_id: branch_id.map(str::to_string),
        ..Default::default()
    }
}

#[test]
fn test_hydrated_store_matches_live_store() {
    // Given: a store written through the SQLite journal
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.db");
    let journal = SqliteJournal::open(&path).unwrap();
    let mut store = VersionStore::new();

    let alice = gateway::create_object(&mut store, &journal, keyed("alice", None)).unwrap();
    let bob = gateway::create_object(&mut store, &journal, keyed("bob", None)).unwrap();
    gateway::create_relationship(
        &mut store,
        &journal,
        CreateRelationshipRequest {
            entity_type: "knows".into(),
            src_id: alice.canonical_id.clone(),
            dst_id: bob.canonical_id.clone(),
            weight: Some(0.5),
            ..Default::default()
        },
    )
    .unwrap();
    let feature = store.create_branch(&journal, "feature", None).unwrap();
    gateway::create_object(&mut store, &journal, keyed("carol", Some(&feature.id))).unwrap();
    gateway::delete_object(&mut store, &journal, &bob.canonical_id, DeleteRequest::default())
        .unwrap();

    // When: the database is reopened and hydrated
    drop(journal);
    let conn = vgraph_store::db::open_and_migrate(&path).unwrap();
    let reloaded = hydrate(&conn).unwrap();

    // Then: every version and branch comes back identical
    let live: Vec<_> = store.versions_in_order().into_iter().cloned().collect();
    let loaded: Vec<_> = reloaded.versions_in_order().into_iter().cloned().collect();
    assert_eq!(live, loaded);
    assert_eq!(reloaded.last_seq(), store.last_seq());
    assert_eq!(reloaded.get_branch(&feature.id).unwrap(), &feature);

    // And: derived state is rebuilt
    assert!(reloaded.get_head(&bob.canonical_id, None).is_err());
    assert_eq!(
        reloaded.get_head(&alice.canonical_id, None).unwrap().id,
        alice.id
    );
    let by_key =
        gateway::find_by_key(&reloaded, vgraph_core::EntityKind::Object, "Person", "carol", Some(&feature.id))
            .unwrap();
    assert!(by_key.is_some());
}

#[test]
fn test_writes_continue_after_hydration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.db");
    {
        let journal = SqliteJournal::open(&path).unwrap();
        let mut store = VersionStore::new();
        gateway::create_object(&mut store, &journal, keyed("alice", None)).unwrap();
    }

    let journal = SqliteJournal::open(&path).unwrap();
    let mut store = journal.with_connection(hydrate).unwrap();

    // Key still taken after reload
    let err = gateway::create_object(&mut store, &journal, keyed("alice", None)).unwrap_err();
    assert!(matches!(err, GraphError::KeyConflict { .. }));

    let next = gateway::create_object(&mut store, &journal, keyed("bob", None)).unwrap();
    assert_eq!(next.seq, 2);
    assert_eq!(
        journal.with_connection(SqliteRepo::count_versions).unwrap(),
        2
    );
}

#[test]
fn test_merge_copies_are_journaled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.db");
    let journal = SqliteJournal::open(&path).unwrap();
    let mut store = VersionStore::new();
    let feature = store.create_branch(&journal, "feature", None).unwrap();
    gateway::create_object(&mut store, &journal, keyed("dora", Some(&feature.id))).unwrap();

    let report = merge_branches(
        &mut store,
        &journal,
        MergeRequest {
            source_branch_id: feature.id.clone(),
            execute: true,
            ..Default::default()
        },
        100,
    )
    .unwrap();
    assert_eq!(report.applied_count(), 1);

    let reloaded = journal.with_connection(hydrate).unwrap();
    let copy = gateway::find_by_key(&reloaded, vgraph_core::EntityKind::Object, "Person", "dora", None)
        .unwrap()
        .unwrap();
    assert!(copy.merged_from.is_some());
}

#[test]
fn test_journal_failure_leaves_store_untouched() {
    // Given: a journal whose table has gone away
    let journal = SqliteJournal::new(vgraph_store::db::open_in_memory().unwrap());
    let mut store = VersionStore::new();

    // When: a write is attempted
    let err = gateway::create_object(&mut store, &journal, keyed("alice", None)).unwrap_err();

    // Then: the write fails as a persistence error and nothing was indexed
    assert_eq!(err.kind(), VgErrorKind::Persistence);
    assert_eq!(store.version_count(), 0);
    assert_eq!(store.last_seq(), 0);
}

#[test]
fn test_batch_append_is_all_or_nothing() {
    // Given: one journaled version
    let dir = tempfile::tempdir().unwrap();
    let journal = SqliteJournal::open(dir.path().join("graph.db")).unwrap();
    let mut store = VersionStore::new();
    let erin = gateway::create_object(&mut store, &journal, keyed("erin", None)).unwrap();

    // When: a batch pairs a fresh record with one that already exists
    let mut fresh = erin.clone();
    fresh.id = "fresh-version".into();
    fresh.seq = erin.seq + 1;
    let err = vgraph_core::VersionJournal::append_versions(&journal, &[fresh, erin.clone()])
        .unwrap_err();

    // Then: the fresh record was rolled back with the duplicate
    assert_eq!(err.kind(), VgErrorKind::Persistence);
    let count = journal.with_connection(SqliteRepo::count_versions).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_inverse_pair_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let journal = SqliteJournal::open(dir.path().join("graph.db")).unwrap();
    let mut store = VersionStore::new();
    let a = gateway::create_object(&mut store, &journal, keyed("frank", None)).unwrap();
    let b = gateway::create_object(&mut store, &journal, keyed("gina", None)).unwrap();
    let created = gateway::create_relationship(
        &mut store,
        &journal,
        CreateRelationshipRequest {
            entity_type: "mentors".into(),
            src_id: a.canonical_id.clone(),
            dst_id: b.canonical_id.clone(),
            inverse_type: Some("mentored_by".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let reloaded = journal.with_connection(hydrate).unwrap();
    let inverse = created.inverse.unwrap();
    assert_eq!(
        reloaded.get_version(&inverse.id).unwrap().content.inverse_of.as_deref(),
        Some(created.relationship.canonical_id.as_str())
    );
    assert_eq!(reloaded.last_seq(), store.last_seq());
}
