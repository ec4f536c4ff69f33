//! Repository layer bridging the in-memory version store to SQLite

pub mod hydration;
pub mod sqlite_repo;

pub use sqlite_repo::{SqliteJournal, SqliteRepo};
