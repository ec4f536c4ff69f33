use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use vgraph_core::gateway::{
    BulkResponse, BulkUpdateObjectItem, CreateObjectRequest, DeleteRequest, RestoreRequest,
    UpdateObjectRequest,
};
use vgraph_core::search::{SearchPage, SearchQuery};
use vgraph_core::{EntityKind, EntityVersion};
use vgraph_engine::{AccessReport, AnalyticsQuery};

use super::error::ApiResult;
use super::extract::{ApiJson, ApiQuery};
use super::{AppState, BranchQuery, BulkBody};

pub async fn create(
    State(engine): State<AppState>,
    ApiJson(req): ApiJson<CreateObjectRequest>,
) -> ApiResult<(StatusCode, Json<EntityVersion>)> {
    let created = engine.create_object(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn bulk_create(
    State(engine): State<AppState>,
    ApiJson(body): ApiJson<BulkBody<CreateObjectRequest>>,
) -> ApiResult<Json<BulkResponse>> {
    Ok(Json(engine.bulk_create_objects(body.items).await?))
}

pub async fn bulk_update(
    State(engine): State<AppState>,
    ApiJson(body): ApiJson<BulkBody<BulkUpdateObjectItem>>,
) -> ApiResult<Json<BulkResponse>> {
    Ok(Json(engine.bulk_update_objects(body.items).await?))
}

pub async fn search(
    State(engine): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<SearchPage>> {
    Ok(Json(engine.search(EntityKind::Object, query).await?))
}

pub async fn most_accessed(
    State(engine): State<AppState>,
    ApiQuery(query): ApiQuery<AnalyticsQuery>,
) -> ApiResult<Json<Vec<AccessReport>>> {
    Ok(Json(engine.most_accessed(EntityKind::Object, query).await?))
}

pub async fn unused(
    State(engine): State<AppState>,
    ApiQuery(query): ApiQuery<AnalyticsQuery>,
) -> ApiResult<Json<Vec<AccessReport>>> {
    Ok(Json(engine.unused(EntityKind::Object, query).await?))
}

pub async fn get_one(
    State(engine): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<BranchQuery>,
) -> ApiResult<Json<EntityVersion>> {
    Ok(Json(engine.get_object(&id, query.branch_id).await?))
}

pub async fn update(
    State(engine): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateObjectRequest>,
) -> ApiResult<Json<EntityVersion>> {
    Ok(Json(engine.update_object(&id, req).await?))
}

/// Deletion parameters come from the query string
pub async fn delete(
    State(engine): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(req): ApiQuery<DeleteRequest>,
) -> ApiResult<Json<EntityVersion>> {
    Ok(Json(engine.delete_object(&id, req).await?))
}

pub async fn restore(
    State(engine): State<AppState>,
    Path(id): Path<String>,
    body: Option<ApiJson<RestoreRequest>>,
) -> ApiResult<Json<EntityVersion>> {
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();
    Ok(Json(engine.restore_object(&id, req).await?))
}

pub async fn history(
    State(engine): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<EntityVersion>>> {
    Ok(Json(engine.object_history(&id).await?))
}
