//! Bulk operations with a bounded worker pool
//!
//! Items run concurrently, up to `bulk_workers` in flight. Each item takes the
//! write lock for its own commit, so two items racing for one key are
//! serialized: one is created and the other reports `key_exists` with the
//! winner's id. Results come back ordered by item index.

use std::time::Instant;

use futures::stream::{self, StreamExt};
use vgraph_core::gateway::{
    self, check_batch, BulkItemResult, BulkResponse, BulkUpdateObjectItem,
    BulkUpdateRelationshipItem, CreateObjectRequest, CreateRelationshipRequest,
};
use vgraph_core::{log_op_start, EntityVersion, Result, VersionJournal, VersionStore};

use crate::engine::{finish, GraphEngine};

impl GraphEngine {
    async fn fan_out<I, F>(&self, items: Vec<I>, created: bool, write: F) -> Result<BulkResponse>
    where
        I: Send,
        F: Fn(&mut VersionStore, &dyn VersionJournal, I) -> Result<EntityVersion> + Sync,
    {
        check_batch(items.len(), self.config.bulk_batch_cap)?;
        let write = &write;
        let results: Vec<(usize, BulkItemResult)> = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| async move {
                let result = self.write(|store, journal| write(store, journal, item)).await;
                (index, BulkItemResult::from_write(result, created))
            })
            .buffer_unordered(self.config.bulk_workers.max(1))
            .collect()
            .await;
        let response = BulkResponse::from_results(results);
        tracing::debug!(
            component = "bulk",
            success = response.success,
            failed = response.failed,
            "bulk batch settled"
        );
        Ok(response)
    }

    /// # Errors
    ///
    /// `Validation` for an empty batch, `LimitExceeded` above the batch cap.
    /// Item failures are reported per item.
    pub async fn bulk_create_objects(&self, items: Vec<CreateObjectRequest>) -> Result<BulkResponse> {
        let op = "bulk_create_objects";
        log_op_start!(op, items = items.len());
        let start = Instant::now();
        let result = self.fan_out(items, true, gateway::create_object).await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `Validation` for an empty batch, `LimitExceeded` above the batch cap.
    pub async fn bulk_create_relationships(
        &self,
        items: Vec<CreateRelationshipRequest>,
    ) -> Result<BulkResponse> {
        let op = "bulk_create_relationships";
        log_op_start!(op, items = items.len());
        let start = Instant::now();
        let result = self
            .fan_out(items, true, |store, journal, item| {
                gateway::create_relationship(store, journal, item).map(|c| c.relationship)
            })
            .await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `Validation` for an empty batch, `LimitExceeded` above the batch cap.
    pub async fn bulk_update_objects(&self, items: Vec<BulkUpdateObjectItem>) -> Result<BulkResponse> {
        let op = "bulk_update_objects";
        log_op_start!(op, items = items.len());
        let start = Instant::now();
        let result = self
            .fan_out(items, false, |store, journal, item: BulkUpdateObjectItem| {
                gateway::update_object(store, journal, &item.id, item.patch)
            })
            .await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `Validation` for an empty batch, `LimitExceeded` above the batch cap.
    pub async fn bulk_update_relationships(
        &self,
        items: Vec<BulkUpdateRelationshipItem>,
    ) -> Result<BulkResponse> {
        let op = "bulk_update_relationships";
        log_op_start!(op, items = items.len());
        let start = Instant::now();
        let result = self
            .fan_out(items, false, |store, journal, item: BulkUpdateRelationshipItem| {
                gateway::update_relationship(store, journal, &item.id, item.patch)
            })
            .await;
        finish(op, start, result)
    }
}
