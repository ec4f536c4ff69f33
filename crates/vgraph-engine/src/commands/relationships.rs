//! Single-relationship operations

use std::time::Instant;

use vgraph_core::gateway::{
    self, CreateRelationshipRequest, CreatedRelationship, DeleteRequest, RestoreRequest,
    UpdateRelationshipRequest,
};
use vgraph_core::model::branch_key;
use vgraph_core::{log_op_start, EntityKind, EntityVersion, Result};

use crate::engine::{finish, GraphEngine};

impl GraphEngine {
    /// Create a relationship and, with `inverse_type`, its inverse, under one lock
    ///
    /// # Errors
    ///
    /// `Validation`, `DanglingReference`, `KeyConflict` or `Persistence`.
    pub async fn create_relationship(
        &self,
        req: CreateRelationshipRequest,
    ) -> Result<CreatedRelationship> {
        let op = "create_relationship";
        log_op_start!(
            op,
            entity_type = req.entity_type.as_str(),
            src_id = req.src_id.as_str(),
            dst_id = req.dst_id.as_str(),
            branch_id = branch_key(req.branch_id.as_deref())
        );
        let start = Instant::now();
        let result = self
            .write(|store, journal| gateway::create_relationship(store, journal, req))
            .await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `NotFound` or `BranchNotFound`.
    pub async fn get_relationship(
        &self,
        id: &str,
        branch_id: Option<String>,
    ) -> Result<EntityVersion> {
        let op = "get_relationship";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .read(|store| gateway::get_relationship(store, id, branch_id).cloned())
            .await;
        if let Ok(head) = &result {
            self.record_access(&head.canonical_id).await;
        }
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `NotFound`, `VersionConflict`, `Validation` or `Persistence`.
    pub async fn update_relationship(
        &self,
        id: &str,
        req: UpdateRelationshipRequest,
    ) -> Result<EntityVersion> {
        let op = "update_relationship";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .write(|store, journal| gateway::update_relationship(store, journal, id, req))
            .await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `NotFound`, `VersionConflict` or `Persistence`.
    pub async fn delete_relationship(&self, id: &str, req: DeleteRequest) -> Result<EntityVersion> {
        let op = "delete_relationship";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .write(|store, journal| gateway::delete_relationship(store, journal, id, req))
            .await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `NotFound`, `Validation`, `DanglingReference`, `KeyConflict` or `Persistence`.
    pub async fn restore_relationship(
        &self,
        id: &str,
        req: RestoreRequest,
    ) -> Result<EntityVersion> {
        let op = "restore_relationship";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .write(|store, journal| gateway::restore_relationship(store, journal, id, req))
            .await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown id or an object id.
    pub async fn relationship_history(&self, id: &str) -> Result<Vec<EntityVersion>> {
        let op = "relationship_history";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .read(|store| {
                gateway::history(store, id, EntityKind::Relationship)
                    .map(|versions| versions.into_iter().cloned().collect())
            })
            .await;
        finish(op, start, result)
    }
}
