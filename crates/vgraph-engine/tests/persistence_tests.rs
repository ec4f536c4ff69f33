//! Engine backed by a SQLite file survives a restart
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::person;
use vgraph_core::gateway::DeleteRequest;
use vgraph_engine::commands::branches::CreateBranchRequest;
use vgraph_engine::{EngineConfig, GraphEngine};

#[tokio::test]
async fn test_reopen_restores_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        database_path: Some(dir.path().join("graph.db")),
        ..EngineConfig::default()
    };

    let (alice, bob, feature) = {
        let engine = GraphEngine::open(config.clone()).unwrap();
        let alice = engine.create_object(person("alice")).await.unwrap();
        let bob = engine.create_object(person("bob")).await.unwrap();
        engine
            .delete_object(&bob.canonical_id, DeleteRequest::default())
            .await
            .unwrap();
        let feature = engine
            .create_branch(CreateBranchRequest {
                name: "feature".into(),
                parent_branch_id: None,
            })
            .await
            .unwrap();
        (alice, bob, feature)
    };

    let engine = GraphEngine::open(config).unwrap();
    let head = engine.get_object(&alice.canonical_id, None).await.unwrap();
    assert_eq!(head.id, alice.id);
    assert!(engine.get_object(&bob.canonical_id, None).await.is_err());
    assert_eq!(engine.object_history(&bob.canonical_id).await.unwrap().len(), 2);
    assert_eq!(engine.get_branch(&feature.id).await.unwrap(), feature);

    let carol = engine.create_object(person("carol")).await.unwrap();
    assert_eq!(carol.seq, 4);
}
