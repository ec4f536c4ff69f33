//! Merge through the engine: snapshot classification, per-item apply
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{engine, person};
use serde_json::json;
use vgraph_core::gateway::{CreateObjectRequest, UpdateObjectRequest};
use vgraph_core::{GraphError, MergeRequest, MergeStatus};
use vgraph_engine::commands::branches::CreateBranchRequest;
use vgraph_engine::{EngineConfig, GraphEngine};

fn on_branch(mut req: CreateObjectRequest, branch_id: &str) -> CreateObjectRequest {
    req.branch_id = Some(branch_id.to_string());
    req
}

#[tokio::test]
async fn test_dry_run_then_apply() {
    // GIVEN an object edited on a branch and a new object there
    let engine = engine();
    let x = engine.create_object(person("x")).await.unwrap();
    let feature = engine
        .create_branch(CreateBranchRequest {
            name: "feature".into(),
            parent_branch_id: None,
        })
        .await
        .unwrap();
    let mut patch = serde_json::Map::new();
    patch.insert("name".into(), json!("edited"));
    engine
        .update_object(
            &x.canonical_id,
            UpdateObjectRequest {
                properties: Some(patch),
                branch_id: Some(feature.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    engine
        .create_object(on_branch(person("y"), &feature.id))
        .await
        .unwrap();

    let request = |execute| MergeRequest {
        source_branch_id: feature.id.clone(),
        target_branch_id: "main".into(),
        execute,
        limit: None,
    };

    // WHEN dry-running
    let dry = engine.merge(request(false)).await.unwrap();

    // THEN nothing moved on main
    assert_eq!(dry.fast_forward_count, 1);
    assert_eq!(dry.added_count, 1);
    assert!(!dry.applied);
    let head = engine.get_object(&x.canonical_id, None).await.unwrap();
    assert_eq!(head.id, x.id);

    // WHEN applying
    let applied = engine.merge(request(true)).await.unwrap();
    assert!(applied.applied);
    assert_eq!(applied.applied_count(), 2);
    assert_eq!(applied.applied_objects, 2);
    let head = engine.get_object(&x.canonical_id, None).await.unwrap();
    assert_eq!(head.content.properties.get("name"), Some(&json!("edited")));

    // AND merging again changes nothing
    let again = engine.merge(request(false)).await.unwrap();
    assert!(again
        .items()
        .all(|item| item.status == MergeStatus::Unchanged));
}

#[tokio::test]
async fn test_merge_limit_above_cap_rejected() {
    let engine = engine();
    let feature = engine
        .create_branch(CreateBranchRequest {
            name: "f".into(),
            parent_branch_id: None,
        })
        .await
        .unwrap();
    let err = engine
        .merge(MergeRequest {
            source_branch_id: feature.id.clone(),
            target_branch_id: String::new(),
            execute: true,
            limit: Some(engine.config().merge_limit_cap + 1),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::LimitExceeded { .. }));
}

#[tokio::test]
async fn test_merge_without_limit_stops_at_cap() {
    // GIVEN an engine capping merges at two items and five new objects on a branch
    let engine = Arc::new(GraphEngine::in_memory(EngineConfig {
        merge_limit_cap: 2,
        ..EngineConfig::default()
    }));
    let feature = engine
        .create_branch(CreateBranchRequest {
            name: "wide".into(),
            parent_branch_id: None,
        })
        .await
        .unwrap();
    for key in ["a", "b", "c", "d", "e"] {
        engine
            .create_object(on_branch(person(key), &feature.id))
            .await
            .unwrap();
    }

    // WHEN applying with no limit
    let report = engine
        .merge(MergeRequest {
            source_branch_id: feature.id.clone(),
            target_branch_id: "main".into(),
            execute: true,
            limit: None,
        })
        .await
        .unwrap();

    // THEN only the capped number is written and the run is truncated
    assert_eq!(report.applied_count(), 2);
    assert!(report.truncated);
    let written = report.objects.iter().filter(|item| item.applied).count();
    assert_eq!(written, 2);

    // AND a second run picks up where the first stopped
    let next = engine
        .merge(MergeRequest {
            source_branch_id: feature.id.clone(),
            target_branch_id: "main".into(),
            execute: true,
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(next.applied_count(), 2);
    assert!(next.truncated);
}

#[tokio::test]
async fn test_merge_unknown_branch() {
    let engine = engine();
    let err = engine
        .merge(MergeRequest {
            source_branch_id: "nope".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::BranchNotFound { .. }));
}

#[tokio::test]
async fn test_branch_listing_and_lookup() {
    let engine = engine();
    let a = engine
        .create_branch(CreateBranchRequest {
            name: "a".into(),
            parent_branch_id: Some("main".into()),
        })
        .await
        .unwrap();
    assert_eq!(a.parent_branch_id, None);
    let b = engine
        .create_branch(CreateBranchRequest {
            name: "b".into(),
            parent_branch_id: Some(a.id.clone()),
        })
        .await
        .unwrap();

    let names: Vec<String> = engine
        .list_branches()
        .await
        .into_iter()
        .map(|branch| branch.name)
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(engine.get_branch(&b.id).await.unwrap().parent_branch_id, Some(a.id));
    assert!(engine.get_branch("missing").await.is_err());
}
