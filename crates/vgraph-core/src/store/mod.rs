//! Identity & version store
//!
//! Holds every version ever committed plus the derived indexes needed to
//! answer head, key and adjacency queries. All indexes are rebuilt from the
//! version rows alone by [`VersionStore::from_parts`].

pub mod journal;
pub mod keys;
pub mod resolver;
mod write;

use std::collections::{BTreeSet, HashMap};

use crate::errors::{GraphError, Result};
use crate::model::{branch_key, Branch, EntityVersion};

pub use journal::{NoopJournal, Precondition, VersionDraft, VersionJournal};

/// Head log entries: `(seq, version_id)` in seq order
pub(crate) type HeadLog = Vec<(u64, String)>;

/// Edge direction relative to an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    Outgoing,
    Incoming,
}

/// In-memory version store
///
/// Not thread-safe on its own; the engine wraps it in a lock and every
/// mutating call is one atomic commit.
#[derive(Debug, Clone, Default)]
pub struct VersionStore {
    /// Version id -> record
    pub(crate) versions: HashMap<String, EntityVersion>,
    /// Canonical id -> version ids in seq order
    pub(crate) chains: HashMap<String, Vec<String>>,
    /// Branch key -> canonical id -> head log
    pub(crate) head_log: HashMap<String, HashMap<String, HeadLog>>,
    /// Branch key -> key slot -> `(seq, holder)` history
    pub(crate) key_log: HashMap<String, HashMap<String, Vec<(u64, Option<String>)>>>,
    /// Branch key -> canonical ids with a version written there
    pub(crate) members: HashMap<String, BTreeSet<String>>,
    /// Object canonical id -> relationship canonical ids leaving it
    pub(crate) outgoing: HashMap<String, BTreeSet<String>>,
    /// Object canonical id -> relationship canonical ids entering it
    pub(crate) incoming: HashMap<String, BTreeSet<String>>,
    pub(crate) branches: HashMap<String, Branch>,
    pub(crate) branch_names: HashMap<String, String>,
    pub(crate) last_seq: u64,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number of the most recent committed write
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Get a version record by version id
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if no version has that id.
    pub fn get_version(&self, version_id: &str) -> Result<&EntityVersion> {
        self.versions
            .get(version_id)
            .ok_or_else(|| GraphError::VersionNotFound {
                version_id: version_id.to_string(),
            })
    }

    /// Resolve a version id or canonical id to its canonical id
    ///
    /// Also returns the branch a version id was written on, used as the
    /// default branch for writes addressed by version id.
    pub fn canonical_of(&self, id: &str) -> Option<(&str, Option<&str>)> {
        if let Some(version) = self.versions.get(id) {
            return Some((version.canonical_id.as_str(), version.branch_id.as_deref()));
        }
        self.chains
            .get_key_value(id)
            .map(|(canonical, _)| (canonical.as_str(), None))
    }

    pub fn contains_canonical(&self, canonical_id: &str) -> bool {
        self.chains.contains_key(canonical_id)
    }

    /// Live head of `canonical_id` as seen from `branch_id`
    ///
    /// # Errors
    ///
    /// Returns `BranchNotFound` for an unknown branch, `NotFound` when there
    /// is no live head.
    pub fn get_head(&self, canonical_id: &str, branch_id: Option<&str>) -> Result<&EntityVersion> {
        let branch = branch_key(branch_id);
        self.require_branch(branch)?;
        self.resolve_head(canonical_id, branch)
            .ok_or_else(|| GraphError::NotFound {
                id: canonical_id.to_string(),
                branch: branch.to_string(),
            })
    }

    /// Tip (tombstones included) of `canonical_id` as seen from `branch_id`
    ///
    /// # Errors
    ///
    /// Returns `BranchNotFound` for an unknown branch, `NotFound` when no
    /// version is visible.
    pub fn get_tip(&self, canonical_id: &str, branch_id: Option<&str>) -> Result<&EntityVersion> {
        let branch = branch_key(branch_id);
        self.require_branch(branch)?;
        self.resolve_tip(canonical_id, branch)
            .ok_or_else(|| GraphError::NotFound {
                id: canonical_id.to_string(),
                branch: branch.to_string(),
            })
    }

    /// Every version of an entity across all branches, ordered by seq
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the canonical id was never minted.
    pub fn get_history(&self, canonical_id: &str) -> Result<Vec<&EntityVersion>> {
        let chain = self
            .chains
            .get(canonical_id)
            .ok_or_else(|| GraphError::NotFound {
                id: canonical_id.to_string(),
                branch: "*".to_string(),
            })?;
        Ok(chain
            .iter()
            .filter_map(|id| self.versions.get(id))
            .collect())
    }

    /// Seq of the first version ever written for the entity
    pub fn first_seq(&self, canonical_id: &str) -> Option<u64> {
        self.chains
            .get(canonical_id)
            .and_then(|chain| chain.first())
            .and_then(|id| self.versions.get(id))
            .map(|v| v.seq)
    }

    /// Canonical ids with at least one version written directly on the branch
    pub fn touched_on(&self, branch_id: Option<&str>) -> Vec<&str> {
        self.members
            .get(branch_key(branch_id))
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Candidate canonical ids visible from a branch
    ///
    /// A superset: callers still resolve heads, since inherited members may
    /// have been created after the fork point.
    pub fn visible_canonicals(&self, branch: &str) -> BTreeSet<&str> {
        self.lineage(branch)
            .into_iter()
            .filter_map(|(level, _)| self.members.get(level))
            .flat_map(|set| set.iter().map(String::as_str))
            .collect()
    }

    /// Relationship canonical ids attached to an object, sorted
    pub fn relationships_of(&self, object_id: &str, direction: Adjacency) -> Vec<&str> {
        let index = match direction {
            Adjacency::Outgoing => &self.outgoing,
            Adjacency::Incoming => &self.incoming,
        };
        index
            .get(object_id)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// All version records, in seq order
    pub fn versions_in_order(&self) -> Vec<&EntityVersion> {
        let mut all: Vec<&EntityVersion> = self.versions.values().collect();
        all.sort_by_key(|v| v.seq);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityContent;

    fn store_with_object() -> (VersionStore, EntityVersion) {
        let mut store = VersionStore::new();
        let v = store
            .commit(
                &NoopJournal,
                VersionDraft::create(None, EntityContent::object("Person").with_key("a")),
            )
            .unwrap();
        (store, v)
    }

    #[test]
    fn test_canonical_of_accepts_both_ids() {
        let (store, v) = store_with_object();
        assert_eq!(
            store.canonical_of(&v.id).map(|(c, _)| c),
            Some(v.canonical_id.as_str())
        );
        assert_eq!(
            store.canonical_of(&v.canonical_id).map(|(c, _)| c),
            Some(v.canonical_id.as_str())
        );
        assert!(store.canonical_of("nope").is_none());
    }

    #[test]
    fn test_get_head_unknown_branch() {
        let (store, v) = store_with_object();
        let err = store.get_head(&v.canonical_id, Some("ghost")).unwrap_err();
        assert!(matches!(err, GraphError::BranchNotFound { .. }));
    }

    #[test]
    fn test_get_version_missing() {
        let store = VersionStore::new();
        assert!(matches!(
            store.get_version("v-x"),
            Err(GraphError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn test_history_missing_canonical() {
        let store = VersionStore::new();
        assert!(matches!(
            store.get_history("c-x"),
            Err(GraphError::NotFound { .. })
        ));
    }
}
