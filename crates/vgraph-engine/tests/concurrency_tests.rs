//! Concurrent writers against one engine
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{engine, person};
use serde_json::json;
use vgraph_core::gateway::{BulkUpdateObjectItem, UpdateObjectRequest};
use vgraph_core::{EntityKind, GraphError};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bulk_same_key_has_one_winner() {
    // GIVEN 20 bulk items sharing one key
    let engine = engine();
    let items = (0..20).map(|_| person("dup")).collect();

    // WHEN they run through the worker pool
    let response = engine.bulk_create_objects(items).await.unwrap();

    // THEN one is created and 19 report the winner
    assert_eq!(response.success, 1);
    assert_eq!(response.failed, 19);
    let winner = response
        .results
        .iter()
        .find_map(|r| r.object.as_ref())
        .unwrap()
        .canonical_id
        .clone();
    for report in response.results.iter().filter(|r| !r.success) {
        assert_eq!(report.status, "conflict");
        let error = report.error.as_ref().unwrap();
        assert_eq!(error.existing_id.as_deref(), Some(winner.as_str()));
    }
    let indexes: Vec<usize> = response.results.iter().map(|r| r.index).collect();
    assert_eq!(indexes, (0..20).collect::<Vec<_>>());

    // AND the key lookup converges on the winner
    let found = engine
        .find_by_key(EntityKind::Object, "Person", "dup", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.canonical_id, winner);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_creates_same_key_across_tasks() {
    let engine = engine();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.create_object(person("racer")).await })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(GraphError::KeyConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unconditional_updates_are_never_lost() {
    // GIVEN one object and 10 concurrent updates without expectations
    let engine = engine();
    let v1 = engine.create_object(person("counter")).await.unwrap();
    let handles: Vec<_> = (0..10)
        .map(|i| {
            let engine = engine.clone();
            let id = v1.canonical_id.clone();
            tokio::spawn(async move {
                let mut patch = serde_json::Map::new();
                patch.insert(format!("writer_{}", i), json!(i));
                engine
                    .update_object(
                        &id,
                        UpdateObjectRequest {
                            properties: Some(patch),
                            ..Default::default()
                        },
                    )
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // THEN every write landed on a linear chain
    let head = engine.get_object(&v1.canonical_id, None).await.unwrap();
    assert_eq!(head.version, 11);
    assert_eq!(head.content.properties.len(), 11);
    let history = engine.object_history(&v1.canonical_id).await.unwrap();
    assert_eq!(history.len(), 11);
}

#[tokio::test]
async fn test_stale_expectation_conflicts() {
    let engine = engine();
    let v1 = engine.create_object(person("cas")).await.unwrap();
    let stale = UpdateObjectRequest {
        status: Some("a".into()),
        expected_head_id: Some(v1.id.clone()),
        ..Default::default()
    };

    engine
        .update_object(&v1.canonical_id, stale.clone())
        .await
        .unwrap();
    let err = engine
        .update_object(&v1.canonical_id, stale)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::VersionConflict { .. }));
}

#[tokio::test]
async fn test_bulk_update_reports_per_item() {
    let engine = engine();
    let v1 = engine.create_object(person("u")).await.unwrap();
    let items = vec![
        BulkUpdateObjectItem {
            id: v1.canonical_id.clone(),
            patch: UpdateObjectRequest {
                status: Some("active".into()),
                ..Default::default()
            },
        },
        BulkUpdateObjectItem {
            id: "missing".into(),
            patch: UpdateObjectRequest::default(),
        },
    ];

    let response = engine.bulk_update_objects(items).await.unwrap();
    assert_eq!(response.success, 1);
    assert_eq!(response.results[0].status, "updated");
    assert_eq!(response.results[1].status, "error");
    assert_eq!(
        response.results[1].error.as_ref().unwrap().code,
        "ERR_NOT_FOUND"
    );
}

#[tokio::test]
async fn test_bulk_batch_cap_is_enforced() {
    let engine = engine();
    let items = (0..101).map(|i| person(&format!("p{}", i))).collect();
    let err = engine.bulk_create_objects(items).await.unwrap_err();
    assert!(matches!(err, GraphError::LimitExceeded { max: 100, .. }));

    let err = engine.bulk_create_objects(Vec::new()).await.unwrap_err();
    assert!(matches!(err, GraphError::Validation { .. }));
}
