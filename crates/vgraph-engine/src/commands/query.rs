//! Read-only queries: search and traversal

use std::time::Instant;

use vgraph_core::search::{self, SearchPage, SearchQuery};
use vgraph_core::traversal::{self, ExpandRequest, ExpandResult, TraverseRequest, TraverseResult};
use vgraph_core::{log_op_start, EntityKind, Result};

use crate::engine::{finish, GraphEngine};

impl GraphEngine {
    /// # Errors
    ///
    /// `BranchNotFound` or `Validation` (bad cursor or limit).
    pub async fn search(&self, kind: EntityKind, query: SearchQuery) -> Result<SearchPage> {
        let op = "search";
        log_op_start!(op, kind = kind.as_str());
        let start = Instant::now();
        let limits = self.config.search;
        let result = self
            .read(|store| search::search(store, kind, &query, &limits))
            .await;
        finish(op, start, result)
    }

    /// Bounded breadth-first expansion from one or more roots
    ///
    /// # Errors
    ///
    /// `Validation`, `LimitExceeded`, `NotFound` or `BranchNotFound`.
    pub async fn expand(&self, req: ExpandRequest) -> Result<ExpandResult> {
        let op = "expand";
        log_op_start!(op, roots = req.root_ids.len(), max_depth = req.max_depth);
        let start = Instant::now();
        let limits = self.config.traversal;
        let result = self
            .read(|store| traversal::expand(store, &req, &limits))
            .await;
        if let Ok(expanded) = &result {
            tracing::debug!(
                component = "traversal",
                nodes = expanded.nodes.len(),
                edges = expanded.edges.len(),
                truncated = expanded.truncated,
                "expand finished"
            );
        }
        finish(op, start, result)
    }

    /// Multi-phase traversal with paged results
    ///
    /// # Errors
    ///
    /// `Validation`, `LimitExceeded`, `NotFound` or `BranchNotFound`.
    pub async fn traverse(&self, req: TraverseRequest) -> Result<TraverseResult> {
        let op = "traverse";
        log_op_start!(op, roots = req.root_ids.len(), phases = req.phases.len());
        let start = Instant::now();
        let limits = self.config.traversal;
        let result = self
            .read(|store| traversal::traverse(store, &req, &limits))
            .await;
        finish(op, start, result)
    }
}
