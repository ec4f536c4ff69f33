//! Branch resolver
//!
//! Answers "what is the head of X as seen from branch B". A branch sees its
//! own writes, and beyond those its parent's state as of the fork point,
//! recursively up to `main`.

use chrono::Utc;
use uuid::Uuid;
use vgraph_core_types::schema::MAIN_BRANCH;

use super::journal::VersionJournal;
use super::VersionStore;
use crate::errors::{GraphError, Result};
use crate::model::{Branch, EntityVersion};

/// Last entry of a seq-ordered log with `seq <= bound`
pub(crate) fn entry_at<T>(log: &[(u64, T)], bound: u64) -> Option<&T> {
    let idx = log.partition_point(|(seq, _)| *seq <= bound);
    idx.checked_sub(1).map(|i| &log[i].1)
}

impl VersionStore {
    /// Branch keys visible from `branch`, each with its seq bound
    ///
    /// The branch itself comes first with an unbounded view; each ancestor
    /// is bounded by the tightest fork point on the way up.
    pub(crate) fn lineage<'a>(&'a self, branch: &'a str) -> Vec<(&'a str, u64)> {
        let mut levels = vec![(branch, u64::MAX)];
        let mut bound = u64::MAX;
        let mut current = self.branches.get(branch);
        while let Some(b) = current {
            if levels.len() > self.branches.len() + 1 {
                break;
            }
            bound = bound.min(b.fork_seq);
            match b.parent_branch_id.as_deref() {
                Some(parent) => {
                    levels.push((parent, bound));
                    current = self.branches.get(parent);
                }
                None => {
                    levels.push((MAIN_BRANCH, bound));
                    current = None;
                }
            }
        }
        levels
    }

    /// Latest version visible from `branch`, tombstones included
    pub fn resolve_tip(&self, canonical_id: &str, branch: &str) -> Option<&EntityVersion> {
        self.lineage(branch).into_iter().find_map(|(level, bound)| {
            self.head_log
                .get(level)
                .and_then(|logs| logs.get(canonical_id))
                .and_then(|log| entry_at(log, bound))
                .and_then(|version_id| self.versions.get(version_id))
        })
    }

    /// Live head visible from `branch`; a tombstone tip hides the entity
    pub fn resolve_head(&self, canonical_id: &str, branch: &str) -> Option<&EntityVersion> {
        self.resolve_tip(canonical_id, branch)
            .filter(|v| v.is_live())
    }

    /// Fail unless `branch` is `main` or a known branch id
    ///
    /// # Errors
    ///
    /// Returns `BranchNotFound` for an unknown id.
    pub fn require_branch(&self, branch: &str) -> Result<()> {
        if branch == MAIN_BRANCH || self.branches.contains_key(branch) {
            Ok(())
        } else {
            Err(GraphError::BranchNotFound {
                branch_id: branch.to_string(),
            })
        }
    }

    /// Create a branch forked from `parent_branch_id` (`None` = main) at the
    /// current write sequence
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank, reserved or duplicate name,
    /// `BranchNotFound` for an unknown parent, and `Persistence` if the
    /// journal rejects the record.
    pub fn create_branch(
        &mut self,
        journal: &dyn VersionJournal,
        name: &str,
        parent_branch_id: Option<&str>,
    ) -> Result<Branch> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GraphError::validation("branch name must not be empty"));
        }
        if name == MAIN_BRANCH {
            return Err(GraphError::validation("branch name 'main' is reserved"));
        }
        if self.branch_names.contains_key(name) {
            return Err(GraphError::validation(format!(
                "branch name '{}' already exists",
                name
            )));
        }
        if let Some(parent) = parent_branch_id {
            self.require_branch(parent)?;
        }

        let branch = Branch {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            parent_branch_id: parent_branch_id.map(str::to_string),
            fork_seq: self.last_seq,
            created_at: Utc::now(),
        };
        journal.append_branch(&branch)?;
        self.insert_branch(branch.clone());
        Ok(branch)
    }

    pub(crate) fn insert_branch(&mut self, branch: Branch) {
        self.branch_names
            .insert(branch.name.clone(), branch.id.clone());
        self.branches.insert(branch.id.clone(), branch);
    }

    /// Get a branch by id
    ///
    /// # Errors
    ///
    /// Returns `BranchNotFound` if the id is unknown.
    pub fn get_branch(&self, branch_id: &str) -> Result<&Branch> {
        self.branches
            .get(branch_id)
            .ok_or_else(|| GraphError::BranchNotFound {
                branch_id: branch_id.to_string(),
            })
    }

    pub fn find_branch_by_name(&self, name: &str) -> Option<&Branch> {
        self.branch_names
            .get(name)
            .and_then(|id| self.branches.get(id))
    }

    /// All branches in creation order
    pub fn list_branches(&self) -> Vec<&Branch> {
        let mut all: Vec<&Branch> = self.branches.values().collect();
        all.sort_by(|a, b| {
            a.fork_seq
                .cmp(&b.fork_seq)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        all
    }
}
