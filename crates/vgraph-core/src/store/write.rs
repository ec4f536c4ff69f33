use chrono::Utc;
use uuid::Uuid;

use super::journal::{Precondition, VersionDraft, VersionJournal};
use super::VersionStore;
use crate::errors::{GraphError, Result};
use crate::model::{branch_key, normalize_branch_id, Branch, EntityKind, EntityVersion};

impl VersionStore {
    /// Commit one new version atomically
    ///
    /// The prior tip is the branch-visible tip (tombstones included). The new
    /// version supersedes it, or supersedes the merge source when the
    /// entity has no version visible on the branch yet.
    ///
    /// # Errors
    ///
    /// - `BranchNotFound` for an unknown branch
    /// - `NotFound` when `canonical_id` was never minted
    /// - `VersionConflict` when the precondition does not match the tip
    /// - `Validation` for a kind change or a relationship without endpoints
    /// - `Persistence` when the journal rejects the record
    pub fn commit(
        &mut self,
        journal: &dyn VersionJournal,
        draft: VersionDraft,
    ) -> Result<EntityVersion> {
        let record = self.prepare(draft, self.last_seq + 1)?;
        journal.append_version(&record)?;
        self.index_version(record.clone());
        Ok(record)
    }

    /// Commit a new entity and one derived from it as a single write
    ///
    /// `derive` builds the second draft from the first record. Both records
    /// are journaled together before either is indexed, so a failure leaves
    /// neither visible. The second draft must not address the first record's
    /// canonical id.
    ///
    /// # Errors
    ///
    /// Same as [`commit`](Self::commit), for either draft.
    pub fn commit_linked(
        &mut self,
        journal: &dyn VersionJournal,
        draft: VersionDraft,
        derive: impl FnOnce(&EntityVersion) -> VersionDraft,
    ) -> Result<(EntityVersion, EntityVersion)> {
        let first = self.prepare(draft, self.last_seq + 1)?;
        let second = self.prepare(derive(&first), first.seq + 1)?;
        if second.canonical_id == first.canonical_id {
            return Err(GraphError::Internal {
                message: format!("linked write addresses {} twice", first.canonical_id),
            });
        }
        journal.append_versions(&[first.clone(), second.clone()])?;
        self.index_version(first.clone());
        self.index_version(second.clone());
        Ok((first, second))
    }

    /// Check `draft` against the current state and build its record
    fn prepare(&self, draft: VersionDraft, seq: u64) -> Result<EntityVersion> {
        let branch_id = normalize_branch_id(draft.branch_id);
        let branch = branch_key(branch_id.as_deref()).to_string();
        self.require_branch(&branch)?;

        if draft.content.kind == EntityKind::Relationship
            && (draft.content.src_id.is_none() || draft.content.dst_id.is_none())
        {
            return Err(GraphError::validation(
                "relationship requires src_id and dst_id",
            ));
        }

        let canonical_id = match draft.canonical_id {
            Some(id) => {
                let first = self
                    .chains
                    .get(&id)
                    .and_then(|chain| chain.first())
                    .and_then(|v| self.versions.get(v))
                    .ok_or_else(|| GraphError::NotFound {
                        id: id.clone(),
                        branch: branch.clone(),
                    })?;
                if first.kind() != draft.content.kind {
                    return Err(GraphError::validation(format!(
                        "{} is a {}, not a {}",
                        id,
                        first.kind(),
                        draft.content.kind
                    )));
                }
                id
            }
            None => Uuid::now_v7().to_string(),
        };

        let prior = self.resolve_tip(&canonical_id, &branch);
        if let Precondition::Expect(expected) = &draft.precondition {
            let actual = prior.map(|p| p.id.clone());
            if *expected != actual {
                return Err(GraphError::VersionConflict {
                    canonical_id,
                    branch,
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let source = match draft.merged_from.as_deref() {
            Some(id) => Some(self.get_version(id)?),
            None => None,
        };

        let supersedes_id = prior.or(source).map(|v| v.id.clone());
        let version = prior
            .map(|v| v.version)
            .max(source.map(|v| v.version))
            .unwrap_or(0)
            + 1;

        let now = Utc::now();
        let record = EntityVersion {
            id: Uuid::now_v7().to_string(),
            canonical_id,
            supersedes_id,
            branch_id,
            version,
            content: draft.content,
            merged_from: draft.merged_from,
            seq,
            deleted_at: draft.tombstone.then_some(now),
            created_at: now,
        };
        Ok(record)
    }

    /// Add a committed version to every derived index
    fn index_version(&mut self, version: EntityVersion) {
        let branch = branch_key(version.branch_id.as_deref()).to_string();

        self.index_key(&version, &branch);
        self.head_log
            .entry(branch.clone())
            .or_default()
            .entry(version.canonical_id.clone())
            .or_default()
            .push((version.seq, version.id.clone()));
        self.members
            .entry(branch)
            .or_default()
            .insert(version.canonical_id.clone());

        let chain = self.chains.entry(version.canonical_id.clone()).or_default();
        if chain.is_empty() {
            if let Some((src, dst)) = version.endpoints() {
                self.outgoing
                    .entry(src.to_string())
                    .or_default()
                    .insert(version.canonical_id.clone());
                self.incoming
                    .entry(dst.to_string())
                    .or_default()
                    .insert(version.canonical_id.clone());
            }
        }
        chain.push(version.id.clone());

        self.last_seq = self.last_seq.max(version.seq);
        self.versions.insert(version.id.clone(), version);
    }

    /// Rebuild a store from persisted branch and version rows
    ///
    /// # Errors
    ///
    /// Returns `Internal` for duplicate ids or versions written on a branch
    /// that is not among `branches`.
    pub fn from_parts(branches: Vec<Branch>, mut versions: Vec<EntityVersion>) -> Result<Self> {
        let mut store = Self::new();
        for branch in branches {
            if store.branches.contains_key(&branch.id) {
                return Err(GraphError::Internal {
                    message: format!("duplicate branch id {}", branch.id),
                });
            }
            store.insert_branch(branch);
        }

        versions.sort_by_key(|v| v.seq);
        for version in versions {
            if store.versions.contains_key(&version.id) {
                return Err(GraphError::Internal {
                    message: format!("duplicate version id {}", version.id),
                });
            }
            if let Some(b) = version.branch_id.as_deref() {
                if !store.branches.contains_key(b) {
                    return Err(GraphError::Internal {
                        message: format!("version {} references unknown branch {}", version.id, b),
                    });
                }
            }
            store.index_version(version);
        }

        for branch in store.branches.values() {
            store.last_seq = store.last_seq.max(branch.fork_seq);
        }
        Ok(store)
    }
}
