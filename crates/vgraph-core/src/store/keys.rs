//! Business-key index
//!
//! Keys are unique per (kind, type) among live heads visible on a branch.
//! Each branch keeps a seq-ordered history of who held each key slot, so a
//! lookup from a child branch can read its parent as of the fork point.

use super::resolver::entry_at;
use super::VersionStore;
use crate::model::{EntityKind, EntityVersion};

/// Index slot for a (kind, type, key) triple
pub(crate) fn key_slot(kind: EntityKind, entity_type: &str, key: &str) -> String {
    format!("{}\u{1f}{}\u{1f}{}", kind.as_str(), entity_type, key)
}

impl VersionStore {
    /// Live entity holding `key` for (kind, type) as seen from `branch`
    pub fn find_by_key(
        &self,
        kind: EntityKind,
        entity_type: &str,
        key: &str,
        branch: &str,
    ) -> Option<&EntityVersion> {
        let slot = key_slot(kind, entity_type, key);
        self.lineage(branch)
            .into_iter()
            .filter_map(|(level, bound)| {
                self.key_log
                    .get(level)
                    .and_then(|slots| slots.get(&slot))
                    .and_then(|log| entry_at(log, bound))
                    .and_then(|holder| holder.as_deref())
            })
            .filter_map(|canonical| self.resolve_head(canonical, branch))
            .find(|head| {
                head.kind() == kind && head.entity_type() == entity_type && head.key() == Some(key)
            })
    }

    /// Record the key state a newly indexed version implies
    pub(crate) fn index_key(&mut self, version: &EntityVersion, branch: &str) {
        let Some(key) = version.key() else {
            return;
        };
        let slot = key_slot(version.kind(), version.entity_type(), key);
        let log = self
            .key_log
            .entry(branch.to_string())
            .or_default()
            .entry(slot)
            .or_default();

        let holder = version.is_live().then(|| version.canonical_id.clone());
        let changed = match log.last() {
            Some((_, current)) if *current == holder => false,
            // A tombstone only clears the slot if this entity held it
            Some((_, Some(current))) => holder.is_some() || *current == version.canonical_id,
            _ => holder.is_some(),
        };
        if changed {
            log.push((version.seq, holder));
        }
    }
}
