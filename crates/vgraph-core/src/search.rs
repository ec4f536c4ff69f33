//! Filtered listing of heads visible on a branch
//!
//! Results are ordered by first-creation sequence so paging is stable while
//! entities are being updated.

use serde::{Deserialize, Serialize};

use crate::cursor::{decode_offset, encode_offset};
use crate::errors::Result;
use crate::model::{branch_key, normalize_branch_id, EntityKind, EntityVersion};
use crate::store::VersionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Page size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 1000,
        }
    }
}

/// Search filters; list-valued fields are comma separated
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "type", default)]
    pub entity_type: Option<String>,
    /// Any of these types
    #[serde(default)]
    pub types: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// All of these labels
    #[serde(default)]
    pub labels: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub src_id: Option<String>,
    #[serde(default)]
    pub dst_id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub include_deleted: Option<bool>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub items: Vec<EntityVersion>,
    pub next_cursor: Option<String>,
}

fn split_list(value: Option<&str>) -> Vec<&str> {
    value
        .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

struct Matcher<'q> {
    kind: EntityKind,
    entity_type: Option<&'q str>,
    types: Vec<&'q str>,
    labels: Vec<&'q str>,
    status: Option<&'q str>,
    key: Option<&'q str>,
    src_id: Option<&'q str>,
    dst_id: Option<&'q str>,
    include_deleted: bool,
}

impl<'q> Matcher<'q> {
    fn new(kind: EntityKind, query: &'q SearchQuery) -> Self {
        let mut labels = split_list(query.labels.as_deref());
        labels.extend(query.label.as_deref().map(str::trim).filter(|l| !l.is_empty()));
        Self {
            kind,
            entity_type: query.entity_type.as_deref(),
            types: split_list(query.types.as_deref()),
            labels,
            status: query.status.as_deref(),
            key: query.key.as_deref(),
            src_id: query.src_id.as_deref(),
            dst_id: query.dst_id.as_deref(),
            include_deleted: query.include_deleted.unwrap_or(false),
        }
    }

    fn matches(&self, v: &EntityVersion) -> bool {
        v.kind() == self.kind
            && (self.include_deleted || v.is_live())
            && self.entity_type.map_or(true, |t| v.entity_type() == t)
            && (self.types.is_empty() || self.types.contains(&v.entity_type()))
            && self.labels.iter().all(|l| v.content.labels.contains(*l))
            && self.status.map_or(true, |s| v.content.status.as_deref() == Some(s))
            && self.key.map_or(true, |k| v.key() == Some(k))
            && self.src_id.map_or(true, |s| v.content.src_id.as_deref() == Some(s))
            && self.dst_id.map_or(true, |d| v.content.dst_id.as_deref() == Some(d))
    }
}

/// List entities of `kind` visible on the query's branch
///
/// # Errors
///
/// `BranchNotFound` for an unknown branch, `Validation` for a bad cursor.
pub fn search(
    store: &VersionStore,
    kind: EntityKind,
    query: &SearchQuery,
    limits: &SearchLimits,
) -> Result<SearchPage> {
    let branch_id = normalize_branch_id(query.branch_id.clone());
    let branch = branch_key(branch_id.as_deref());
    store.require_branch(branch)?;
    let offset = query
        .cursor
        .as_deref()
        .map(decode_offset)
        .transpose()?
        .unwrap_or(0);
    let limit = query
        .limit
        .unwrap_or(limits.default_limit)
        .clamp(1, limits.max_limit.max(1));

    let matcher = Matcher::new(kind, query);
    let mut hits: Vec<(u64, &EntityVersion)> = store
        .visible_canonicals(branch)
        .into_iter()
        .filter_map(|canonical| store.resolve_tip(canonical, branch))
        .filter(|v| matcher.matches(v))
        .map(|v| (store.first_seq(&v.canonical_id).unwrap_or(v.seq), v))
        .collect();

    hits.sort_by_key(|(seq, _)| *seq);
    if query.order.unwrap_or_default() == SortOrder::Desc {
        hits.reverse();
    }

    let total = hits.len();
    let end = offset.saturating_add(limit).min(total);
    let items = hits
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(_, v)| v.clone())
        .collect();

    Ok(SearchPage {
        items,
        next_cursor: (end < total).then(|| encode_offset(end)),
    })
}
