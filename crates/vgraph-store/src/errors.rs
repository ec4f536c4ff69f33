//! Error handling for vgraph-store
//!
//! Wraps vgraph-core VgError with store-specific helpers

use vgraph_core::errors::{VgError, VgErrorKind};

/// Result type alias using VgError
pub type Result<T> = std::result::Result<T, VgError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> VgError {
    VgError::new(VgErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// An applied migration whose recorded checksum no longer matches the embedded SQL
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> VgError {
    VgError::new(VgErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> VgError {
    VgError::new(VgErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// A stored row that cannot be decoded back into a record
pub fn corrupt_row(table: &str, id: &str, reason: impl std::fmt::Display) -> VgError {
    VgError::new(VgErrorKind::Serialization)
        .with_op("hydrate")
        .with_entity_id(id.to_string())
        .with_message(format!("Corrupt row in {}: {}", table, reason))
}

pub fn from_serde(op: &str, err: serde_json::Error) -> VgError {
    VgError::new(VgErrorKind::Serialization)
        .with_op(op.to_string())
        .with_message(err.to_string())
}
