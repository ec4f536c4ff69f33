use super::{plan, MergeItem, MergeReport, MergeRequest, MergeStatus};
use crate::errors::{GraphError, Result};
use crate::gateway::{ensure_key_free, ensure_live_object};
use crate::model::{branch_key, normalize_branch_id, EntityVersion};
use crate::store::{Precondition, VersionDraft, VersionJournal, VersionStore};

/// Write one `added` or `fast_forward` item onto the target
///
/// The target tip must still be the one seen at classification time, and a
/// relationship's endpoints must be live on the target at this point.
///
/// # Errors
///
/// `VersionConflict` when the target moved, `DanglingReference` for a dead
/// endpoint, `KeyConflict` when the key was taken, `Persistence` on journal
/// failure.
pub fn apply_item(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    item: &MergeItem,
    target_branch_id: Option<&str>,
) -> Result<EntityVersion> {
    let source_head_id = item
        .source_head_id
        .as_deref()
        .ok_or_else(|| GraphError::Internal {
            message: format!("merge item {} has no source head", item.canonical_id),
        })?;
    let source = store.get_version(source_head_id)?.clone();
    let target = branch_key(target_branch_id);

    if source.is_live() {
        if let Some((src, dst)) = source.endpoints() {
            ensure_live_object(store, src, target)?;
            ensure_live_object(store, dst, target)?;
        }
        ensure_key_free(store, &source.content, target, Some(&item.canonical_id))?;
    }

    let mut draft = VersionDraft::revise(
        item.canonical_id.clone(),
        target_branch_id.map(str::to_string),
        source.content,
    )
    .merged_from(source.id)
    .expecting(Precondition::Expect(item.target_head_id.clone()));
    if source.deleted_at.is_some() {
        draft = draft.tombstone();
    }
    store.commit(journal, draft)
}

/// Record the outcome of [`apply_item`] on the item
///
/// Contention outcomes downgrade the item; anything else is returned.
///
/// # Errors
///
/// Returns errors that are not per-item contention (e.g. persistence).
pub fn settle(item: &mut MergeItem, outcome: Result<EntityVersion>) -> Result<()> {
    match outcome {
        Ok(version) => {
            item.applied = true;
            item.version_id = Some(version.id);
            Ok(())
        }
        Err(err @ (GraphError::VersionConflict { .. } | GraphError::KeyConflict { .. })) => {
            item.status = MergeStatus::Conflict;
            item.conflicts.push(err.to_string());
            Ok(())
        }
        Err(err @ GraphError::DanglingReference { .. }) => {
            item.status = MergeStatus::DanglingReference;
            item.conflicts.push(err.to_string());
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Number of items an apply run may write
///
/// Without a `limit` the run is bounded by `cap`.
///
/// # Errors
///
/// `Validation` for a zero limit, `LimitExceeded` for a limit above `cap`.
pub fn merge_budget(limit: Option<usize>, cap: usize) -> Result<usize> {
    match limit {
        Some(0) => Err(GraphError::validation("limit must be positive")),
        Some(limit) if limit > cap => Err(GraphError::LimitExceeded {
            what: "merge limit".to_string(),
            requested: limit,
            max: cap,
        }),
        Some(limit) => Ok(limit),
        None => Ok(cap),
    }
}

/// Items an apply run writes, in plan order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Indexes into the planned items
    pub indexes: Vec<usize>,
    /// Applicable items were left out by the budget
    pub truncated: bool,
}

/// Pick the applicable items that fit in `budget`
pub fn schedule(items: &[MergeItem], budget: usize) -> Schedule {
    let applicable: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.status.is_applicable())
        .map(|(index, _)| index)
        .collect();
    let truncated = applicable.len() > budget;
    Schedule {
        indexes: applicable.into_iter().take(budget).collect(),
        truncated,
    }
}

/// Classify and, with `execute`, apply a merge in one synchronous pass
///
/// # Errors
///
/// `Validation` for identical branches or a zero limit, `LimitExceeded` for
/// a limit above `cap`, `BranchNotFound`, and any non-contention error
/// raised while applying.
pub fn merge_branches(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    req: MergeRequest,
    cap: usize,
) -> Result<MergeReport> {
    let budget = merge_budget(req.limit, cap)?;
    let source = normalize_branch_id(Some(req.source_branch_id));
    let target = normalize_branch_id(Some(req.target_branch_id));

    let mut items = plan(store, source.as_deref(), target.as_deref())?;
    let mut truncated = false;
    if req.execute {
        let run = schedule(&items, budget);
        truncated = run.truncated;
        for index in run.indexes {
            let item = &mut items[index];
            let outcome = apply_item(store, journal, item, target.as_deref());
            settle(item, outcome)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    #[test]
    fn test_budget_defaults_to_cap() {
        assert_eq!(merge_budget(None, 7).unwrap(), 7);
        assert_eq!(merge_budget(Some(3), 7).unwrap(), 3);
        assert!(matches!(
            merge_budget(Some(0), 7),
            Err(GraphError::Validation { .. })
        ));
        assert!(matches!(
            merge_budget(Some(8), 7),
            Err(GraphError::LimitExceeded { max: 7, .. })
        ));
    }

    #[test]
    fn test_schedule_skips_unapplicable_and_truncates() {
        let items = vec![
            MergeItem::new("a", EntityKind::Object, MergeStatus::Added),
            MergeItem::new("b", EntityKind::Object, MergeStatus::Conflict),
            MergeItem::new("c", EntityKind::Object, MergeStatus::FastForward),
            MergeItem::new("d", EntityKind::Relationship, MergeStatus::Added),
        ];
        let run = schedule(&items, 2);
        assert_eq!(run.indexes, vec![0, 2]);
        assert!(run.truncated);

        let all = schedule(&items, 3);
        assert_eq!(all.indexes, vec![0, 2, 3]);
        assert!(!all.truncated);
    }
}
