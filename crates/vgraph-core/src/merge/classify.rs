use std::collections::HashSet;

use super::ancestry::{ancestors, is_ancestor, path_to};
use super::{MergeItem, MergeStatus};
use crate::errors::{GraphError, Result};
use crate::model::{branch_key, EntityKind, EntityVersion};
use crate::store::VersionStore;

/// Objects whose merge outcome changes liveness on the target
#[derive(Default)]
struct MergedObjects<'a> {
    live: HashSet<&'a str>,
    dead: HashSet<&'a str>,
}

/// Classify every canonical id touched on the source branch
///
/// Items are ordered objects first, each group by canonical id.
///
/// # Errors
///
/// `Validation` when source and target are the same branch,
/// `BranchNotFound` for an unknown branch.
pub fn plan(
    store: &VersionStore,
    source_branch_id: Option<&str>,
    target_branch_id: Option<&str>,
) -> Result<Vec<MergeItem>> {
    let source = branch_key(source_branch_id);
    let target = branch_key(target_branch_id);
    if source == target {
        return Err(GraphError::validation(
            "source and target branch must differ",
        ));
    }
    store.require_branch(source)?;
    store.require_branch(target)?;

    let mut objects = Vec::new();
    let mut relationships = Vec::new();
    for canonical_id in store.touched_on(source_branch_id) {
        if let Some(tip) = store.resolve_tip(canonical_id, source) {
            match tip.kind() {
                EntityKind::Object => objects.push(tip),
                EntityKind::Relationship => relationships.push(tip),
            }
        }
    }

    let mut merged = MergedObjects::default();
    let mut items = Vec::with_capacity(objects.len() + relationships.len());
    for tip in objects {
        let item = classify_one(store, tip, target);
        if item.status.is_applicable() {
            if tip.is_live() {
                merged.live.insert(tip.canonical_id.as_str());
            } else {
                merged.dead.insert(tip.canonical_id.as_str());
            }
        }
        items.push(item);
    }
    for tip in relationships {
        let mut item = classify_one(store, tip, target);
        if item.status.is_applicable() && tip.is_live() {
            check_endpoints(store, tip, target, &merged, &mut item);
        }
        items.push(item);
    }
    Ok(items)
}

fn classify_one(store: &VersionStore, source_tip: &EntityVersion, target: &str) -> MergeItem {
    let canonical_id = source_tip.canonical_id.as_str();
    let mut item = MergeItem::new(canonical_id, source_tip.kind(), MergeStatus::Unchanged);
    item.source_head_id = Some(source_tip.id.clone());

    let Some(target_tip) = store.resolve_tip(canonical_id, target) else {
        // A tombstone has nothing to add where the entity never existed
        if source_tip.is_live() {
            item.status = MergeStatus::Added;
            check_key(store, source_tip, target, &mut item);
        }
        return item;
    };
    item.target_head_id = Some(target_tip.id.clone());

    // Equal content needs no new version, whatever the lineage
    if is_ancestor(store, &source_tip.id, &target_tip.id)
        || source_tip.semantically_equal(target_tip)
    {
        return item;
    }
    if is_ancestor(store, &target_tip.id, &source_tip.id) {
        item.status = MergeStatus::FastForward;
        check_key(store, source_tip, target, &mut item);
        return item;
    }

    item.status = MergeStatus::Conflict;
    let source_ancestry = ancestors(store, &source_tip.id);
    let target_ancestry = ancestors(store, &target_tip.id);
    item.source_paths = path_to(store, &source_tip.id, &target_ancestry);
    item.target_paths = path_to(store, &target_tip.id, &source_ancestry);
    item.conflicts = source_tip.content.differing_fields(&target_tip.content);
    if source_tip.is_deleted() != target_tip.is_deleted() {
        item.conflicts.push("deleted".to_string());
    }
    item
}

/// Downgrade to conflict if another live entity holds the key on the target
fn check_key(store: &VersionStore, source_tip: &EntityVersion, target: &str, item: &mut MergeItem) {
    if source_tip.is_deleted() {
        return;
    }
    let Some(key) = source_tip.key() else {
        return;
    };
    if let Some(holder) = store.find_by_key(source_tip.kind(), source_tip.entity_type(), key, target) {
        if holder.canonical_id != source_tip.canonical_id {
            item.status = MergeStatus::Conflict;
            item.conflicts
                .push(format!("key '{}' held by {}", key, holder.canonical_id));
        }
    }
}

fn check_endpoints(
    store: &VersionStore,
    source_tip: &EntityVersion,
    target: &str,
    merged: &MergedObjects<'_>,
    item: &mut MergeItem,
) {
    let Some((src, dst)) = source_tip.endpoints() else {
        return;
    };
    for (field, endpoint) in [("src_id", src), ("dst_id", dst)] {
        let live_on_target = !merged.dead.contains(endpoint)
            && store
                .resolve_head(endpoint, target)
                .is_some_and(|head| head.kind() == EntityKind::Object);
        if !live_on_target && !merged.live.contains(endpoint) {
            item.status = MergeStatus::DanglingReference;
            item.conflicts
                .push(format!("{} {} is not live on the target", field, endpoint));
        }
    }
}
