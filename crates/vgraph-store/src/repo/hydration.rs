//! Hydration layer - rebuilds a VersionStore from SQLite rows
//!
//! Versions are read in `seq` order and handed to
//! [`VersionStore::from_parts`], which recomputes every derived index.

use crate::errors::{corrupt_row, from_rusqlite, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use vgraph_core::errors::VgError;
use vgraph_core::{Branch, EntityContent, EntityKind, EntityVersion, VersionStore};

struct VersionRow {
    id: String,
    canonical_id: String,
    supersedes_id: Option<String>,
    branch_id: Option<String>,
    version: u64,
    kind: String,
    content: String,
    merged_from: Option<String>,
    seq: u64,
    deleted_at: Option<String>,
    created_at: String,
}

fn parse_time(table: &str, id: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt_row(table, id, e))
}

impl VersionRow {
    fn into_version(self) -> Result<EntityVersion> {
        let content: EntityContent =
            serde_json::from_str(&self.content).map_err(|e| corrupt_row("entity_versions", &self.id, e))?;
        if EntityKind::parse(&self.kind) != Some(content.kind) {
            return Err(corrupt_row(
                "entity_versions",
                &self.id,
                format!("kind column '{}' disagrees with content", self.kind),
            ));
        }
        let deleted_at = self
            .deleted_at
            .as_deref()
            .map(|raw| parse_time("entity_versions", &self.id, raw))
            .transpose()?;
        let created_at = parse_time("entity_versions", &self.id, &self.created_at)?;
        Ok(EntityVersion {
            id: self.id,
            canonical_id: self.canonical_id,
            supersedes_id: self.supersedes_id,
            branch_id: self.branch_id,
            version: self.version,
            content,
            merged_from: self.merged_from,
            seq: self.seq,
            deleted_at,
            created_at,
        })
    }
}

/// Load all branches ordered by fork sequence
///
/// # Errors
///
/// Returns a persistence error on query failure or a serialization error for a
/// malformed timestamp.
pub fn load_branches(conn: &Connection) -> Result<Vec<Branch>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, parent_branch_id, fork_seq, created_at
             FROM branches ORDER BY fork_seq, id",
        )
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter()
        .map(|(id, name, parent_branch_id, fork_seq, created_at)| {
            let created_at = parse_time("branches", &id, &created_at)?;
            Ok(Branch {
                id,
                name,
                parent_branch_id,
                fork_seq,
                created_at,
            })
        })
        .collect()
}

/// Load all versions in write order
///
/// # Errors
///
/// Returns a persistence error on query failure or a serialization error for
/// an undecodable row.
pub fn load_versions(conn: &Connection) -> Result<Vec<EntityVersion>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, canonical_id, supersedes_id, branch_id, version, kind, content,
                    merged_from, seq, deleted_at, created_at
             FROM entity_versions ORDER BY seq",
        )
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(VersionRow {
                id: row.get(0)?,
                canonical_id: row.get(1)?,
                supersedes_id: row.get(2)?,
                branch_id: row.get(3)?,
                version: row.get(4)?,
                kind: row.get(5)?,
                content: row.get(6)?,
                merged_from: row.get(7)?,
                seq: row.get(8)?,
                deleted_at: row.get(9)?,
                created_at: row.get(10)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter().map(VersionRow::into_version).collect()
}

/// Rebuild the whole in-memory store from the database
///
/// # Errors
///
/// Returns an error if any row cannot be loaded or the rows do not form a
/// consistent store.
pub fn hydrate(conn: &Connection) -> Result<VersionStore> {
    let branches = load_branches(conn)?;
    let versions = load_versions(conn)?;
    let (branch_count, version_count) = (branches.len(), versions.len());
    let store = VersionStore::from_parts(branches, versions)
        .map_err(|e| VgError::from(e).with_op("hydrate"))?;
    tracing::info!(
        component = "hydration",
        branches = branch_count,
        versions = version_count,
        last_seq = store.last_seq(),
        "store hydrated"
    );
    Ok(store)
}
