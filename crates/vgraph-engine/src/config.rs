//! Engine configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `VGRAPH__*` environment variables (`__` separates nesting, e.g.
//! `VGRAPH__TRAVERSAL__MAX_DEPTH=4`).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use vgraph_core::search::SearchLimits;
use vgraph_core::{GraphError, Result, TraversalLimits};

pub const ENV_PREFIX: &str = "VGRAPH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum items per bulk call
    pub bulk_batch_cap: usize,
    /// Concurrent items in flight per bulk call
    pub bulk_workers: usize,
    /// Largest accepted merge `limit`
    pub merge_limit_cap: usize,
    /// Days without a read before an entity counts as unused
    pub unused_after_days: u32,
    pub traversal: TraversalLimits,
    pub search: SearchLimits,
    /// SQLite file; `None` keeps everything in memory
    pub database_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bulk_batch_cap: 100,
            bulk_workers: 8,
            merge_limit_cap: 10_000,
            unused_after_days: 30,
            traversal: TraversalLimits::default(),
            search: SearchLimits::default(),
            database_path: None,
        }
    }
}

impl EngineConfig {
    /// Load defaults, then `path` (if given), then the process environment
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unreadable file or a malformed value.
    pub fn load(path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        Self::load_from(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Same as [`load`](Self::load) with an explicit environment source
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unreadable file or a malformed value.
    pub fn load_from(
        path: Option<&Path>,
        env: Environment,
    ) -> std::result::Result<Self, ConfigError> {
        let defaults = Config::try_from(&EngineConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        builder
            .add_source(env.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Reject settings the engine cannot run with
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("bulk_batch_cap", self.bulk_batch_cap),
            ("bulk_workers", self.bulk_workers),
            ("merge_limit_cap", self.merge_limit_cap),
            ("traversal.max_depth", self.traversal.max_depth),
            ("traversal.max_nodes", self.traversal.max_nodes),
            ("traversal.max_edges", self.traversal.max_edges),
            ("traversal.max_roots", self.traversal.max_roots),
            ("search.default_limit", self.search.default_limit),
            ("search.max_limit", self.search.max_limit),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(GraphError::validation(format!("{} must be positive", name)));
        }
        if self.search.default_limit > self.search.max_limit {
            return Err(GraphError::validation(
                "search.default_limit must not exceed search.max_limit",
            ));
        }
        Ok(())
    }
}
