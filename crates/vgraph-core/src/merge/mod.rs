//! Merge engine
//!
//! A merge moves the changes of a source branch onto a target branch, one
//! canonical id at a time. Classification is read-only and deterministic;
//! applying writes at most one version per item, each guarded by a CAS on
//! the target tip observed during classification.

pub mod ancestry;
mod apply;
mod classify;

use serde::{Deserialize, Serialize};

pub use apply::{apply_item, merge_branches, merge_budget, schedule, settle, Schedule};
pub use classify::plan;

use crate::model::EntityKind;

/// Classification of one canonical id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    Unchanged,
    Added,
    FastForward,
    Conflict,
    DanglingReference,
}

impl MergeStatus {
    /// Statuses an apply run writes
    pub fn is_applicable(&self) -> bool {
        matches!(self, MergeStatus::Added | MergeStatus::FastForward)
    }
}

/// Per-canonical merge entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeItem {
    pub canonical_id: String,
    pub kind: EntityKind,
    pub status: MergeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_head_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_head_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_paths: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_paths: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
    pub applied: bool,
    /// Version written on the target when applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

impl MergeItem {
    pub(crate) fn new(canonical_id: &str, kind: EntityKind, status: MergeStatus) -> Self {
        Self {
            canonical_id: canonical_id.to_string(),
            kind,
            status,
            source_head_id: None,
            target_head_id: None,
            source_paths: Vec::new(),
            target_paths: Vec::new(),
            conflicts: Vec::new(),
            applied: false,
            version_id: None,
        }
    }
}

/// Merge request; branch ids accept `"main"`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MergeRequest {
    #[serde(alias = "sourceBranchId")]
    pub source_branch_id: String,
    #[serde(default)]
    pub target_branch_id: String,
    #[serde(default)]
    pub execute: bool,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Outcome of a dry run or an apply run
///
/// Items are listed per kind in classification order.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub source_branch_id: String,
    pub target_branch_id: String,
    pub execute: bool,
    pub objects: Vec<MergeItem>,
    pub relationships: Vec<MergeItem>,
    pub unchanged_count: usize,
    pub added_count: usize,
    pub fast_forward_count: usize,
    pub conflict_count: usize,
    pub dangling_count: usize,
    /// Whether the run wrote at least one version
    pub applied: bool,
    pub applied_objects: usize,
    pub applied_relationships: usize,
    pub truncated: bool,
}

impl MergeReport {
    pub fn new(
        source_branch_id: &str,
        target_branch_id: &str,
        execute: bool,
        items: Vec<MergeItem>,
        truncated: bool,
    ) -> Self {
        let count = |status: MergeStatus| items.iter().filter(|i| i.status == status).count();
        let (unchanged_count, added_count, fast_forward_count, conflict_count, dangling_count) = (
            count(MergeStatus::Unchanged),
            count(MergeStatus::Added),
            count(MergeStatus::FastForward),
            count(MergeStatus::Conflict),
            count(MergeStatus::DanglingReference),
        );
        let (objects, relationships): (Vec<MergeItem>, Vec<MergeItem>) = items
            .into_iter()
            .partition(|i| i.kind == EntityKind::Object);
        let applied_objects = objects.iter().filter(|i| i.applied).count();
        let applied_relationships = relationships.iter().filter(|i| i.applied).count();
        Self {
            source_branch_id: source_branch_id.to_string(),
            target_branch_id: target_branch_id.to_string(),
            execute,
            objects,
            relationships,
            unchanged_count,
            added_count,
            fast_forward_count,
            conflict_count,
            dangling_count,
            applied: applied_objects + applied_relationships > 0,
            applied_objects,
            applied_relationships,
            truncated,
        }
    }

    /// All items, objects first
    pub fn items(&self) -> impl Iterator<Item = &MergeItem> {
        self.objects.iter().chain(self.relationships.iter())
    }

    /// Number of versions the run wrote
    pub fn applied_count(&self) -> usize {
        self.applied_objects + self.applied_relationships
    }
}
