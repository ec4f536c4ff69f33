use std::sync::Arc;

use serde_json::json;
use vgraph_core::gateway::CreateObjectRequest;
use vgraph_engine::{EngineConfig, GraphEngine};

#[allow(dead_code)]
pub fn engine() -> Arc<GraphEngine> {
    Arc::new(GraphEngine::in_memory(EngineConfig::default()))
}

#[allow(dead_code)]
pub fn person(key: &str) -> CreateObjectRequest {
    CreateObjectRequest {
        entity_type: "Person".into(),
        key: Some(key.into()),
        properties: json!({ "name": key }).as_object().cloned(),
        ..Default::default()
    }
}
