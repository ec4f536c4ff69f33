use axum::extract::State;
use axum::Json;
use serde::Serialize;
use vgraph_core::traversal::{ExpandRequest, ExpandResult, TraverseRequest, TraverseResult};

use super::error::ApiResult;
use super::extract::ApiJson;
use super::AppState;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    timestamp: String,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn expand(
    State(engine): State<AppState>,
    ApiJson(req): ApiJson<ExpandRequest>,
) -> ApiResult<Json<ExpandResult>> {
    Ok(Json(engine.expand(req).await?))
}

pub async fn traverse(
    State(engine): State<AppState>,
    ApiJson(req): ApiJson<TraverseRequest>,
) -> ApiResult<Json<TraverseResult>> {
    Ok(Json(engine.traverse(req).await?))
}
