//! Bulk mutation results
//!
//! Every item of a bulk call is independent: it yields its own
//! [`BulkItemResult`] and a failing item never rolls back or blocks its
//! siblings. Only the batch shape (empty or over the cap) fails the call.

use serde::Serialize;

use super::requests::{
    BulkUpdateObjectItem, BulkUpdateRelationshipItem, CreateObjectRequest,
    CreateRelationshipRequest,
};
use super::{create_object, create_relationship, update_object, update_relationship};
use crate::errors::{GraphError, Result, VgError};
use crate::model::EntityVersion;
use crate::store::{VersionJournal, VersionStore};

/// Why an item lost a race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    KeyExists,
    VersionConflict,
}

/// Outcome of one bulk item
#[derive(Debug, Clone, PartialEq)]
pub enum BulkItemResult {
    Created(EntityVersion),
    Updated(EntityVersion),
    Conflict {
        reason: ConflictReason,
        /// Canonical id of the entity that holds the key or head
        existing_id: Option<String>,
        message: String,
    },
    Error {
        code: String,
        message: String,
    },
}

impl BulkItemResult {
    /// Classify the outcome of a single write
    pub fn from_write(result: Result<EntityVersion>, created: bool) -> Self {
        match result {
            Ok(version) if created => BulkItemResult::Created(version),
            Ok(version) => BulkItemResult::Updated(version),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn from_error(err: GraphError) -> Self {
        let message = err.to_string();
        match err {
            GraphError::KeyConflict { existing_id, .. } => BulkItemResult::Conflict {
                reason: ConflictReason::KeyExists,
                existing_id: Some(existing_id),
                message,
            },
            GraphError::VersionConflict { canonical_id, .. } => BulkItemResult::Conflict {
                reason: ConflictReason::VersionConflict,
                existing_id: Some(canonical_id),
                message,
            },
            other => {
                let err: VgError = other.into();
                BulkItemResult::Error {
                    code: err.code().to_string(),
                    message,
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            BulkItemResult::Created(_) | BulkItemResult::Updated(_)
        )
    }
}

/// Error part of a per-item report
#[derive(Debug, Clone, Serialize)]
pub struct BulkItemError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ConflictReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<String>,
}

/// Per-item entry of a bulk response
#[derive(Debug, Clone, Serialize)]
pub struct BulkItemReport {
    pub index: usize,
    pub success: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<EntityVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BulkItemError>,
}

impl BulkItemReport {
    pub fn new(index: usize, result: BulkItemResult) -> Self {
        let success = result.is_success();
        let (status, object, error) = match result {
            BulkItemResult::Created(v) => ("created", Some(v), None),
            BulkItemResult::Updated(v) => ("updated", Some(v), None),
            BulkItemResult::Conflict {
                reason,
                existing_id,
                message,
            } => {
                let code = match reason {
                    ConflictReason::KeyExists => "ERR_KEY_CONFLICT",
                    ConflictReason::VersionConflict => "ERR_VERSION_CONFLICT",
                };
                (
                    "conflict",
                    None,
                    Some(BulkItemError {
                        code: code.to_string(),
                        message,
                        reason: Some(reason),
                        existing_id,
                    }),
                )
            }
            BulkItemResult::Error { code, message } => (
                "error",
                None,
                Some(BulkItemError {
                    code,
                    message,
                    reason: None,
                    existing_id: None,
                }),
            ),
        };
        Self {
            index,
            success,
            status,
            object,
            error,
        }
    }
}

/// Aggregate bulk response, results ordered by item index
#[derive(Debug, Clone, Serialize)]
pub struct BulkResponse {
    pub success: usize,
    pub failed: usize,
    pub results: Vec<BulkItemReport>,
}

impl BulkResponse {
    /// Build from results produced in any order
    pub fn from_results(results: impl IntoIterator<Item = (usize, BulkItemResult)>) -> Self {
        let mut reports: Vec<BulkItemReport> = results
            .into_iter()
            .map(|(index, result)| BulkItemReport::new(index, result))
            .collect();
        reports.sort_by_key(|r| r.index);
        let success = reports.iter().filter(|r| r.success).count();
        Self {
            success,
            failed: reports.len() - success,
            results: reports,
        }
    }
}

/// Validate batch shape before any item runs
///
/// # Errors
///
/// `Validation` for an empty batch, `LimitExceeded` above `cap`.
pub fn check_batch(len: usize, cap: usize) -> Result<()> {
    if len == 0 {
        return Err(GraphError::validation("items must not be empty"));
    }
    if len > cap {
        return Err(GraphError::LimitExceeded {
            what: "bulk items".to_string(),
            requested: len,
            max: cap,
        });
    }
    Ok(())
}

/// Create objects one by one
///
/// # Errors
///
/// Fails only on batch shape; item errors are reported per item.
pub fn bulk_create_objects(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    items: Vec<CreateObjectRequest>,
    cap: usize,
) -> Result<BulkResponse> {
    check_batch(items.len(), cap)?;
    Ok(BulkResponse::from_results(
        items.into_iter().enumerate().map(|(index, item)| {
            (
                index,
                BulkItemResult::from_write(create_object(store, journal, item), true),
            )
        }),
    ))
}

/// Create relationships one by one
///
/// # Errors
///
/// Fails only on batch shape.
pub fn bulk_create_relationships(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    items: Vec<CreateRelationshipRequest>,
    cap: usize,
) -> Result<BulkResponse> {
    check_batch(items.len(), cap)?;
    Ok(BulkResponse::from_results(
        items.into_iter().enumerate().map(|(index, item)| {
            let result = create_relationship(store, journal, item).map(|c| c.relationship);
            (index, BulkItemResult::from_write(result, true))
        }),
    ))
}

/// Update objects one by one
///
/// # Errors
///
/// Fails only on batch shape.
pub fn bulk_update_objects(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    items: Vec<BulkUpdateObjectItem>,
    cap: usize,
) -> Result<BulkResponse> {
    check_batch(items.len(), cap)?;
    Ok(BulkResponse::from_results(
        items.into_iter().enumerate().map(|(index, item)| {
            let result = update_object(store, journal, &item.id, item.patch);
            (index, BulkItemResult::from_write(result, false))
        }),
    ))
}

/// Update relationships one by one
///
/// # Errors
///
/// Fails only on batch shape.
pub fn bulk_update_relationships(
    store: &mut VersionStore,
    journal: &dyn VersionJournal,
    items: Vec<BulkUpdateRelationshipItem>,
    cap: usize,
) -> Result<BulkResponse> {
    check_batch(items.len(), cap)?;
    Ok(BulkResponse::from_results(
        items.into_iter().enumerate().map(|(index, item)| {
            let result = update_relationship(store, journal, &item.id, item.patch);
            (index, BulkItemResult::from_write(result, false))
        }),
    ))
}
