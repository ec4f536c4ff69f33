//! Version ancestry over `supersedes_id` and `merged_from` links

use std::collections::{HashSet, VecDeque};

use crate::store::VersionStore;

/// Every version reachable from `version_id` through parent links,
/// `version_id` included
pub fn ancestors<'a>(store: &'a VersionStore, version_id: &'a str) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([version_id]);
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        if let Ok(version) = store.get_version(id) {
            queue.extend(version.parents());
        }
    }
    seen
}

/// Whether `ancestor` is reachable from `descendant` (a version is its own ancestor)
pub fn is_ancestor(store: &VersionStore, ancestor: &str, descendant: &str) -> bool {
    if ancestor == descendant {
        return true;
    }
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([descendant]);
    while let Some(id) = queue.pop_front() {
        if id == ancestor {
            return true;
        }
        if !seen.insert(id) {
            continue;
        }
        if let Ok(version) = store.get_version(id) {
            queue.extend(version.parents());
        }
    }
    false
}

/// Versions from `head` back to, excluding, anything in `stop`
///
/// Newest first.
pub fn path_to<'a>(store: &'a VersionStore, head: &'a str, stop: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([head]);
    let mut path = Vec::new();
    while let Some(id) = queue.pop_front() {
        if stop.contains(id) || !seen.insert(id) {
            continue;
        }
        if let Ok(version) = store.get_version(id) {
            path.push((version.seq, id));
            queue.extend(version.parents());
        }
    }
    path.sort_by(|a, b| b.0.cmp(&a.0));
    path.into_iter().map(|(_, id)| id.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityContent;
    use crate::store::{NoopJournal, VersionDraft};

    #[test]
    fn test_chain_ancestry() {
        let mut store = VersionStore::new();
        let v1 = store
            .commit(
                &NoopJournal,
                VersionDraft::create(None, EntityContent::object("Doc")),
            )
            .unwrap();
        let v2 = store
            .commit(
                &NoopJournal,
                VersionDraft::revise(&v1.canonical_id, None, v1.content.clone()),
            )
            .unwrap();
        let v3 = store
            .commit(
                &NoopJournal,
                VersionDraft::revise(&v1.canonical_id, None, v1.content.clone()),
            )
            .unwrap();

        assert!(is_ancestor(&store, &v1.id, &v3.id));
        assert!(!is_ancestor(&store, &v3.id, &v1.id));
        assert_eq!(ancestors(&store, &v3.id).len(), 3);

        let stop = ancestors(&store, &v1.id);
        assert_eq!(path_to(&store, &v3.id, &stop), vec![v3.id.clone(), v2.id.clone()]);
    }

    #[test]
    fn test_merge_link_counts_as_ancestry() {
        let mut store = VersionStore::new();
        let branch = store.create_branch(&NoopJournal, "b", None).unwrap();
        let on_branch = store
            .commit(
                &NoopJournal,
                VersionDraft::create(Some(branch.id.clone()), EntityContent::object("Doc")),
            )
            .unwrap();
        let copied = store
            .commit(
                &NoopJournal,
                VersionDraft::revise(&on_branch.canonical_id, None, on_branch.content.clone())
                    .merged_from(&on_branch.id),
            )
            .unwrap();

        assert_eq!(copied.supersedes_id.as_deref(), Some(on_branch.id.as_str()));
        assert!(is_ancestor(&store, &on_branch.id, &copied.id));
    }
}
