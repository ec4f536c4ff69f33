use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use vgraph_core::{Branch, MergeReport, MergeRequest};
use vgraph_engine::commands::branches::CreateBranchRequest;

use super::error::ApiResult;
use super::extract::ApiJson;
use super::AppState;

pub async fn create(
    State(engine): State<AppState>,
    ApiJson(req): ApiJson<CreateBranchRequest>,
) -> ApiResult<(StatusCode, Json<Branch>)> {
    let branch = engine.create_branch(req).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

pub async fn list(State(engine): State<AppState>) -> Json<Vec<Branch>> {
    Json(engine.list_branches().await)
}

pub async fn get_one(
    State(engine): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Branch>> {
    Ok(Json(engine.get_branch(&id).await?))
}

/// Merge `sourceBranchId` (body) into the branch named in the path
pub async fn merge(
    State(engine): State<AppState>,
    Path(target_branch_id): Path<String>,
    ApiJson(mut req): ApiJson<MergeRequest>,
) -> ApiResult<Json<MergeReport>> {
    req.target_branch_id = target_branch_id;
    Ok(Json(engine.merge(req).await?))
}
