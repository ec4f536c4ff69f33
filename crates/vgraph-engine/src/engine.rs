//! Shared engine state

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};
use vgraph_core::{
    log_op_end, log_op_error, NoopJournal, Result, VersionJournal, VersionStore,
};
use vgraph_store::SqliteJournal;

use crate::analytics::AccessLog;
use crate::config::EngineConfig;

/// Journal shared between request tasks
pub type SharedJournal = Arc<dyn VersionJournal + Send + Sync>;

/// The graph engine: one version store shared by all request tasks
///
/// Every mutation takes the write lock for exactly one commit (two for a
/// relationship with a materialized inverse), so CAS preconditions and key
/// checks are evaluated against the state the commit lands on. Nothing is
/// awaited while a lock is held.
pub struct GraphEngine {
    pub(crate) store: RwLock<VersionStore>,
    pub(crate) journal: SharedJournal,
    pub(crate) access: Mutex<AccessLog>,
    pub(crate) config: EngineConfig,
}

impl GraphEngine {
    /// Engine over an existing store and journal
    pub fn new(store: VersionStore, journal: SharedJournal, config: EngineConfig) -> Self {
        Self {
            store: RwLock::new(store),
            journal,
            access: Mutex::new(AccessLog::default()),
            config,
        }
    }

    /// Empty engine that keeps nothing on disk
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(VersionStore::new(), Arc::new(NoopJournal), config)
    }

    /// Open the engine described by `config`
    ///
    /// With a `database_path` the SQLite file is migrated and the store is
    /// hydrated from it; otherwise the engine starts empty and in memory.
    ///
    /// # Errors
    ///
    /// `Validation` for unusable settings, `Persistence` when the database
    /// cannot be opened, migrated or hydrated.
    pub fn open(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let Some(path) = config.database_path.clone() else {
            tracing::info!(component = "engine", "starting in-memory engine");
            return Ok(Self::in_memory(config));
        };
        let journal = SqliteJournal::open(&path)?;
        let store = journal.with_connection(vgraph_store::hydrate)?;
        tracing::info!(
            component = "engine",
            database = %path.display(),
            versions = store.version_count(),
            "engine opened"
        );
        Ok(Self::new(store, Arc::new(journal), config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `f` under the write lock
    pub(crate) async fn write<T>(
        &self,
        f: impl FnOnce(&mut VersionStore, &dyn VersionJournal) -> Result<T>,
    ) -> Result<T> {
        let mut store = self.store.write().await;
        f(&mut store, self.journal.as_ref())
    }

    /// Run `f` under the read lock
    pub(crate) async fn read<T>(&self, f: impl FnOnce(&VersionStore) -> Result<T>) -> Result<T> {
        let store = self.store.read().await;
        f(&store)
    }
}

/// Emit the terminal boundary event for `op` and pass the result through
pub(crate) fn finish<T>(op: &'static str, start: Instant, result: Result<T>) -> Result<T> {
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(op, duration_ms = duration_ms);
        }
        Err(err) => {
            log_op_error!(op, err.clone(), duration_ms = duration_ms);
        }
    }
    result
}
