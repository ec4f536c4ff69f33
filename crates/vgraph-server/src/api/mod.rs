//! HTTP API
//!
//! Routes live under `/api/graph`; every branch id parameter also accepts
//! `main`.

mod branches;
pub mod error;
mod extract;
mod graph;
pub mod middleware;
mod objects;
mod relationships;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vgraph_engine::GraphEngine;

pub type AppState = Arc<GraphEngine>;

/// `?branch_id=` on single-entity reads
#[derive(Debug, Default, Deserialize)]
pub struct BranchQuery {
    #[serde(default)]
    pub branch_id: Option<String>,
}

/// `{"items": [...]}` body of the bulk endpoints
#[derive(Debug, Deserialize)]
pub struct BulkBody<T> {
    pub items: Vec<T>,
}

/// Build the application router
pub fn router(engine: AppState) -> Router {
    Router::new()
        .route("/health", get(graph::health))
        .nest("/api/graph", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(middleware::request_span))
        .layer(axum::middleware::from_fn(middleware::request_context))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/objects", post(objects::create))
        .route(
            "/objects/bulk",
            post(objects::bulk_create).patch(objects::bulk_update),
        )
        .route("/objects/search", get(objects::search))
        .route(
            "/objects/analytics/most-accessed",
            get(objects::most_accessed),
        )
        .route("/objects/analytics/unused", get(objects::unused))
        .route(
            "/objects/:id",
            get(objects::get_one)
                .patch(objects::update)
                .delete(objects::delete),
        )
        .route("/objects/:id/restore", post(objects::restore))
        .route("/objects/:id/history", get(objects::history))
        .route("/relationships", post(relationships::create))
        .route(
            "/relationships/bulk",
            post(relationships::bulk_create).patch(relationships::bulk_update),
        )
        .route("/relationships/search", get(relationships::search))
        .route(
            "/relationships/analytics/most-accessed",
            get(relationships::most_accessed),
        )
        .route(
            "/relationships/analytics/unused",
            get(relationships::unused),
        )
        .route(
            "/relationships/:id",
            get(relationships::get_one)
                .patch(relationships::update)
                .delete(relationships::delete),
        )
        .route("/relationships/:id/restore", post(relationships::restore))
        .route("/relationships/:id/history", get(relationships::history))
        .route("/branches", post(branches::create).get(branches::list))
        .route("/branches/:id", get(branches::get_one))
        .route("/branches/:id/merge", post(branches::merge))
        .route("/expand", post(graph::expand))
        .route("/traverse", post(graph::traverse))
}

/// Serve until the process is interrupted
pub async fn serve(engine: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(component = "api", %addr, "listening");
    axum::serve(listener, router(engine))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!(component = "api", "shutting down");
        })
        .await?;
    Ok(())
}
