use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use vgraph_core::gateway::{
    BulkResponse, BulkUpdateRelationshipItem, CreateRelationshipRequest, CreatedRelationship,
    DeleteRequest, RestoreRequest, UpdateRelationshipRequest,
};
use vgraph_core::search::{SearchPage, SearchQuery};
use vgraph_core::{EntityKind, EntityVersion};
use vgraph_engine::{AccessReport, AnalyticsQuery};

use super::error::ApiResult;
use super::extract::{ApiJson, ApiQuery};
use super::{AppState, BranchQuery, BulkBody};

pub async fn create(
    State(engine): State<AppState>,
    ApiJson(req): ApiJson<CreateRelationshipRequest>,
) -> ApiResult<(StatusCode, Json<CreatedRelationship>)> {
    let created = engine.create_relationship(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn bulk_create(
    State(engine): State<AppState>,
    ApiJson(body): ApiJson<BulkBody<CreateRelationshipRequest>>,
) -> ApiResult<Json<BulkResponse>> {
    Ok(Json(engine.bulk_create_relationships(body.items).await?))
}

pub async fn bulk_update(
    State(engine): State<AppState>,
    ApiJson(body): ApiJson<BulkBody<BulkUpdateRelationshipItem>>,
) -> ApiResult<Json<BulkResponse>> {
    Ok(Json(engine.bulk_update_relationships(body.items).await?))
}

pub async fn search(
    State(engine): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<SearchPage>> {
    Ok(Json(engine.search(EntityKind::Relationship, query).await?))
}

pub async fn most_accessed(
    State(engine): State<AppState>,
    ApiQuery(query): ApiQuery<AnalyticsQuery>,
) -> ApiResult<Json<Vec<AccessReport>>> {
    Ok(Json(
        engine.most_accessed(EntityKind::Relationship, query).await?,
    ))
}

pub async fn unused(
    State(engine): State<AppState>,
    ApiQuery(query): ApiQuery<AnalyticsQuery>,
) -> ApiResult<Json<Vec<AccessReport>>> {
    Ok(Json(engine.unused(EntityKind::Relationship, query).await?))
}

pub async fn get_one(
    State(engine): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<BranchQuery>,
) -> ApiResult<Json<EntityVersion>> {
    Ok(Json(engine.get_relationship(&id, query.branch_id).await?))
}

pub async fn update(
    State(engine): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateRelationshipRequest>,
) -> ApiResult<Json<EntityVersion>> {
    Ok(Json(engine.update_relationship(&id, req).await?))
}

pub async fn delete(
    State(engine): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(req): ApiQuery<DeleteRequest>,
) -> ApiResult<Json<EntityVersion>> {
    Ok(Json(engine.delete_relationship(&id, req).await?))
}

pub async fn restore(
    State(engine): State<AppState>,
    Path(id): Path<String>,
    body: Option<ApiJson<RestoreRequest>>,
) -> ApiResult<Json<EntityVersion>> {
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();
    Ok(Json(engine.restore_relationship(&id, req).await?))
}

pub async fn history(
    State(engine): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<EntityVersion>>> {
    Ok(Json(engine.relationship_history(&id).await?))
}
