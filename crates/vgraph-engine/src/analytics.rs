//! Read-access analytics
//!
//! Single-entity reads are counted per canonical id (across branches). The
//! counts live in memory only and start empty on every process start.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use vgraph_core::model::{branch_key, normalize_branch_id};
use vgraph_core::{log_op_start, EntityKind, EntityVersion, GraphError, Result, VersionStore};

use crate::engine::{finish, GraphEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessStat {
    pub count: u64,
    pub last_accessed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct AccessLog {
    stats: HashMap<String, AccessStat>,
}

impl AccessLog {
    pub fn record(&mut self, canonical_id: &str, at: DateTime<Utc>) {
        self.stats
            .entry(canonical_id.to_string())
            .and_modify(|stat| {
                stat.count += 1;
                stat.last_accessed_at = stat.last_accessed_at.max(at);
            })
            .or_insert(AccessStat {
                count: 1,
                last_accessed_at: at,
            });
    }

    pub fn get(&self, canonical_id: &str) -> Option<&AccessStat> {
        self.stats.get(canonical_id)
    }
}

/// Query parameters shared by both analytics endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Idle window for `unused`; defaults to the configured value
    #[serde(default)]
    pub days: Option<u32>,
}

/// A live head with its access statistics
#[derive(Debug, Clone, Serialize)]
pub struct AccessReport {
    #[serde(flatten)]
    pub entity: EntityVersion,
    pub access_count: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

/// Live heads of `kind` on the branch, in first-creation order
fn live_heads(
    store: &VersionStore,
    kind: EntityKind,
    branch_id: Option<&str>,
) -> Result<Vec<EntityVersion>> {
    let branch = branch_key(branch_id);
    store.require_branch(branch)?;
    let mut heads: Vec<&EntityVersion> = store
        .visible_canonicals(branch)
        .into_iter()
        .filter_map(|canonical| store.resolve_head(canonical, branch))
        .filter(|head| head.kind() == kind)
        .collect();
    heads.sort_by_key(|head| store.first_seq(&head.canonical_id));
    Ok(heads.into_iter().cloned().collect())
}

impl GraphEngine {
    pub(crate) async fn record_access(&self, canonical_id: &str) {
        self.access.lock().await.record(canonical_id, Utc::now());
    }

    fn page_limit(&self, limit: Option<usize>) -> Result<usize> {
        match limit {
            Some(0) => Err(GraphError::validation("limit must be positive")),
            Some(n) => Ok(n.min(self.config.search.max_limit)),
            None => Ok(self.config.search.default_limit),
        }
    }

    /// Live entities of `kind` with the most recorded reads, busiest first
    ///
    /// Entities never read are left out.
    ///
    /// # Errors
    ///
    /// `BranchNotFound` for an unknown branch, `Validation` for a zero limit.
    pub async fn most_accessed(
        &self,
        kind: EntityKind,
        query: AnalyticsQuery,
    ) -> Result<Vec<AccessReport>> {
        let op = "most_accessed";
        log_op_start!(op, kind = kind.as_str());
        let start = Instant::now();
        let result = self.most_accessed_impl(kind, query).await;
        finish(op, start, result)
    }

    async fn most_accessed_impl(
        &self,
        kind: EntityKind,
        query: AnalyticsQuery,
    ) -> Result<Vec<AccessReport>> {
        let limit = self.page_limit(query.limit)?;
        let branch_id = normalize_branch_id(query.branch_id);
        let heads = self
            .read(|store| live_heads(store, kind, branch_id.as_deref()))
            .await?;
        let access = self.access.lock().await;
        let mut reports: Vec<AccessReport> = heads
            .into_iter()
            .filter_map(|entity| {
                let stat = *access.get(&entity.canonical_id)?;
                Some(AccessReport {
                    entity,
                    access_count: stat.count,
                    last_accessed_at: Some(stat.last_accessed_at),
                })
            })
            .collect();
        reports.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then_with(|| a.entity.canonical_id.cmp(&b.entity.canonical_id))
        });
        reports.truncate(limit);
        Ok(reports)
    }

    /// Live entities of `kind` not read within `days` (or never read), oldest first
    ///
    /// # Errors
    ///
    /// `BranchNotFound` for an unknown branch, `Validation` for a zero limit.
    pub async fn unused(
        &self,
        kind: EntityKind,
        query: AnalyticsQuery,
    ) -> Result<Vec<AccessReport>> {
        let op = "unused";
        log_op_start!(op, kind = kind.as_str());
        let start = Instant::now();
        let result = self.unused_impl(kind, query).await;
        finish(op, start, result)
    }

    async fn unused_impl(
        &self,
        kind: EntityKind,
        query: AnalyticsQuery,
    ) -> Result<Vec<AccessReport>> {
        let limit = self.page_limit(query.limit)?;
        let days = query.days.unwrap_or(self.config.unused_after_days);
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let branch_id = normalize_branch_id(query.branch_id);
        let heads = self
            .read(|store| live_heads(store, kind, branch_id.as_deref()))
            .await?;
        let access = self.access.lock().await;
        Ok(heads
            .into_iter()
            .filter_map(|entity| {
                let stat = access.get(&entity.canonical_id).copied();
                match stat {
                    Some(s) if s.last_accessed_at >= cutoff => None,
                    _ => Some(AccessReport {
                        entity,
                        access_count: stat.map_or(0, |s| s.count),
                        last_accessed_at: stat.map(|s| s.last_accessed_at),
                    }),
                }
            })
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_log_counts_and_keeps_latest() {
        let mut log = AccessLog::default();
        let early = Utc::now() - Duration::days(2);
        let late = Utc::now();
        log.record("c1", late);
        log.record("c1", early);
        let stat = log.get("c1").unwrap();
        assert_eq!(stat.count, 2);
        assert_eq!(stat.last_accessed_at, late);
        assert!(log.get("c2").is_none());
    }
}
