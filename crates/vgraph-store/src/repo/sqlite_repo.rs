//! SQLite repository implementation
//!
//! Rows are only ever inserted. A version or branch that already exists is a
//! persistence error, never an overwrite.

use std::path::Path;
use std::sync::Mutex;

use crate::errors::{from_rusqlite, from_serde, Result};
use rusqlite::Connection;
use vgraph_core::errors::{VgError, VgErrorKind};
use vgraph_core::{Branch, EntityVersion, VersionJournal};

/// Row writers for the version log
pub struct SqliteRepo;

impl SqliteRepo {
    /// Insert one version row
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the insert fails (including a duplicate id or seq).
    pub fn persist_version(conn: &Connection, version: &EntityVersion) -> Result<()> {
        let content =
            serde_json::to_string(&version.content).map_err(|e| from_serde("persist_version", e))?;
        conn.execute(
            "INSERT INTO entity_versions (
                id, canonical_id, supersedes_id, branch_id, version, kind, entity_type,
                entity_key, content, merged_from, seq, deleted_at, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                version.id,
                version.canonical_id,
                version.supersedes_id,
                version.branch_id,
                version.version,
                version.kind().as_str(),
                version.entity_type(),
                version.key(),
                content,
                version.merged_from,
                version.seq,
                version.deleted_at.map(|t| t.to_rfc3339()),
                version.created_at.to_rfc3339(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Insert one branch row
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the insert fails.
    pub fn persist_branch(conn: &Connection, branch: &Branch) -> Result<()> {
        conn.execute(
            "INSERT INTO branches (id, name, parent_branch_id, fork_seq, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                branch.id,
                branch.name,
                branch.parent_branch_id,
                branch.fork_seq,
                branch.created_at.to_rfc3339(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Number of stored version rows
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the count query fails.
    pub fn count_versions(conn: &Connection) -> Result<u64> {
        conn.query_row("SELECT COUNT(*) FROM entity_versions", [], |row| row.get(0))
            .map_err(from_rusqlite)
    }
}

/// [`VersionJournal`] that appends every committed record to SQLite
///
/// The connection sits behind a mutex so the journal can be shared across
/// tasks; the version store only calls it while holding its own write lock.
pub struct SqliteJournal {
    conn: Mutex<Connection>,
}

impl SqliteJournal {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open, configure and migrate `path`, then wrap it
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the database cannot be opened or migrated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::db::open_and_migrate(path).map(Self::new)
    }

    /// Run `f` against the underlying connection
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or an internal error if the lock is poisoned.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| {
            VgError::new(VgErrorKind::Internal)
                .with_op("sqlite_journal")
                .with_message("journal connection lock poisoned")
        })?;
        f(&conn)
    }
}

impl VersionJournal for SqliteJournal {
    fn append_version(&self, version: &EntityVersion) -> std::result::Result<(), VgError> {
        self.with_connection(|conn| SqliteRepo::persist_version(conn, version))
            .map_err(|e| e.with_entity_id(version.id.clone()))
    }

    fn append_versions(&self, versions: &[EntityVersion]) -> std::result::Result<(), VgError> {
        self.with_connection(|conn| {
            let tx = conn.unchecked_transaction().map_err(from_rusqlite)?;
            for version in versions {
                SqliteRepo::persist_version(&tx, version)
                    .map_err(|e| e.with_entity_id(version.id.clone()))?;
            }
            tx.commit().map_err(from_rusqlite)
        })
    }

    fn append_branch(&self, branch: &Branch) -> std::result::Result<(), VgError> {
        self.with_connection(|conn| SqliteRepo::persist_branch(conn, branch))
            .map_err(|e| e.with_branch_id(branch.id.clone()))
    }
}
