//! Single-object operations

use std::time::Instant;

use vgraph_core::gateway::{
    self, CreateObjectRequest, DeleteRequest, RestoreRequest, UpdateObjectRequest,
};
use vgraph_core::model::branch_key;
use vgraph_core::{log_op_start, EntityKind, EntityVersion, Result};

use crate::engine::{finish, GraphEngine};

impl GraphEngine {
    /// # Errors
    ///
    /// `Validation`, `BranchNotFound`, `KeyConflict` or `Persistence`.
    pub async fn create_object(&self, req: CreateObjectRequest) -> Result<EntityVersion> {
        let op = "create_object";
        log_op_start!(
            op,
            entity_type = req.entity_type.as_str(),
            branch_id = branch_key(req.branch_id.as_deref())
        );
        let start = Instant::now();
        let result = self
            .write(|store, journal| gateway::create_object(store, journal, req))
            .await;
        finish(op, start, result)
    }

    /// Live head of an object; counts as one read for analytics
    ///
    /// # Errors
    ///
    /// `NotFound` or `BranchNotFound`.
    pub async fn get_object(&self, id: &str, branch_id: Option<String>) -> Result<EntityVersion> {
        let op = "get_object";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .read(|store| gateway::get_object(store, id, branch_id).cloned())
            .await;
        if let Ok(head) = &result {
            self.record_access(&head.canonical_id).await;
        }
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `NotFound`, `VersionConflict`, `Validation` or `Persistence`.
    pub async fn update_object(&self, id: &str, req: UpdateObjectRequest) -> Result<EntityVersion> {
        let op = "update_object";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .write(|store, journal| gateway::update_object(store, journal, id, req))
            .await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `NotFound`, `VersionConflict` or `Persistence`.
    pub async fn delete_object(&self, id: &str, req: DeleteRequest) -> Result<EntityVersion> {
        let op = "delete_object";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .write(|store, journal| gateway::delete_object(store, journal, id, req))
            .await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `NotFound`, `Validation` (already live), `KeyConflict` or `Persistence`.
    pub async fn restore_object(&self, id: &str, req: RestoreRequest) -> Result<EntityVersion> {
        let op = "restore_object";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .write(|store, journal| gateway::restore_object(store, journal, id, req))
            .await;
        finish(op, start, result)
    }

    /// Every version of an object across branches, oldest first
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id or a relationship id.
    pub async fn object_history(&self, id: &str) -> Result<Vec<EntityVersion>> {
        let op = "object_history";
        log_op_start!(op, id = id);
        let start = Instant::now();
        let result = self
            .read(|store| {
                gateway::history(store, id, EntityKind::Object)
                    .map(|versions| versions.into_iter().cloned().collect())
            })
            .await;
        finish(op, start, result)
    }

    /// Live entity holding `key` for `(kind, entity_type)` on the branch
    ///
    /// # Errors
    ///
    /// `BranchNotFound` for an unknown branch.
    pub async fn find_by_key(
        &self,
        kind: EntityKind,
        entity_type: &str,
        key: &str,
        branch_id: Option<&str>,
    ) -> Result<Option<EntityVersion>> {
        self.read(|store| {
            gateway::find_by_key(store, kind, entity_type, key, branch_id).map(|v| v.cloned())
        })
        .await
    }
}
