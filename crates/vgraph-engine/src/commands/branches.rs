//! Branch management and merge

use std::time::Instant;

use serde::Deserialize;
use vgraph_core::merge::{self, MergeReport, MergeRequest};
use vgraph_core::model::{branch_key, normalize_branch_id};
use vgraph_core::{log_op_start, Branch, Result};

use crate::engine::{finish, GraphEngine};

/// Body of a branch creation call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,
    #[serde(default, alias = "parentBranchId")]
    pub parent_branch_id: Option<String>,
}

impl GraphEngine {
    /// # Errors
    ///
    /// `Validation` for a blank, reserved or taken name, `BranchNotFound`
    /// for an unknown parent, `Persistence` on journal failure.
    pub async fn create_branch(&self, req: CreateBranchRequest) -> Result<Branch> {
        let op = "create_branch";
        log_op_start!(op, name = req.name.as_str());
        let start = Instant::now();
        let parent = normalize_branch_id(req.parent_branch_id);
        let result = self
            .write(|store, journal| store.create_branch(journal, &req.name, parent.as_deref()))
            .await;
        finish(op, start, result)
    }

    /// # Errors
    ///
    /// `BranchNotFound` for an unknown id.
    pub async fn get_branch(&self, branch_id: &str) -> Result<Branch> {
        self.read(|store| store.get_branch(branch_id).cloned()).await
    }

    pub async fn list_branches(&self) -> Vec<Branch> {
        let store = self.store.read().await;
        store.list_branches().into_iter().cloned().collect()
    }

    /// Classify `source` against `target` and, with `execute`, apply it
    ///
    /// Classification runs on one read-locked snapshot. Applying takes the
    /// write lock once per item and re-checks the target head against the
    /// classified one, so a concurrent write turns that item into a conflict
    /// rather than being overwritten. Items already applied stay applied if
    /// the call is abandoned part way. Without a `limit` the run stops at the
    /// configured cap and reports `truncated`.
    ///
    /// # Errors
    ///
    /// `Validation` for identical branches or a zero limit, `LimitExceeded`
    /// for a limit above the configured cap, `BranchNotFound`, and
    /// persistence failures while applying.
    pub async fn merge(&self, req: MergeRequest) -> Result<MergeReport> {
        let op = "merge";
        let target = normalize_branch_id(Some(req.target_branch_id.clone()));
        log_op_start!(
            op,
            source_branch_id = req.source_branch_id.as_str(),
            target_branch_id = branch_key(target.as_deref()),
            execute = req.execute
        );
        let start = Instant::now();
        let result = self.merge_impl(req).await;
        if let Ok(report) = &result {
            tracing::info!(
                component = "merge",
                applied = report.applied_count(),
                conflicts = report.conflict_count,
                dangling = report.dangling_count,
                truncated = report.truncated,
                "merge settled"
            );
        }
        finish(op, start, result)
    }

    async fn merge_impl(&self, req: MergeRequest) -> Result<MergeReport> {
        let budget = merge::merge_budget(req.limit, self.config.merge_limit_cap)?;
        let source = normalize_branch_id(Some(req.source_branch_id));
        let target = normalize_branch_id(Some(req.target_branch_id));

        let mut items = self
            .read(|store| merge::plan(store, source.as_deref(), target.as_deref()))
            .await?;

        let mut truncated = false;
        if req.execute {
            let run = merge::schedule(&items, budget);
            truncated = run.truncated;
            for index in run.indexes {
                let item = &mut items[index];
                let outcome = {
                    let mut store = self.store.write().await;
                    merge::apply_item(&mut store, self.journal.as_ref(), item, target.as_deref())
                };
                merge::settle(item, outcome)?;
            }
        }

        Ok(MergeReport::new(
            branch_key(source.as_deref()),
            branch_key(target.as_deref()),
            req.execute,
            items,
            truncated,
        ))
    }
}
