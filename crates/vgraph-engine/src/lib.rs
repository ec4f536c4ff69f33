//! vgraph Engine - async orchestration layer
//!
//! Wraps the synchronous domain kernel in shared state that many request
//! tasks can use at once:
//! - one `tokio::sync::RwLock` around the [`VersionStore`](vgraph_core::VersionStore),
//!   taken for writing once per committed version
//! - a bounded worker pool for bulk calls
//! - merges classified on a snapshot and applied item by item
//! - read-access analytics
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging: every public operation emits
//! `log_op_start!` then exactly one of `log_op_end!` / `log_op_error!`.

pub mod analytics;
pub mod commands;
pub mod config;
pub mod engine;

pub use analytics::{AccessReport, AnalyticsQuery};
pub use config::EngineConfig;
pub use engine::GraphEngine;
