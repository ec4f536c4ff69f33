//! vgraph Store - SQLite persistence for the version log
//!
//! Provides:
//! - Connection management
//! - Embedded, checksummed schema migrations
//! - An append-only [`VersionJournal`](vgraph_core::VersionJournal) over SQLite
//! - Hydration of a [`VersionStore`](vgraph_core::VersionStore) from stored rows

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use errors::Result;
pub use repo::{hydration::hydrate, SqliteJournal, SqliteRepo};
