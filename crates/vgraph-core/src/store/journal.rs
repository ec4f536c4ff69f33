//! Durability hook for committed writes
//!
//! The version store hands every version and branch to a [`VersionJournal`]
//! before touching its in-memory indexes. A journal error aborts the write.

use crate::errors::VgError;
use crate::model::{Branch, EntityContent, EntityVersion};

/// Append-only sink for committed records
pub trait VersionJournal {
    /// Persist a version record
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the record could not be written.
    fn append_version(&self, version: &EntityVersion) -> Result<(), VgError>;

    /// Persist several version records as one unit
    ///
    /// Journals that can write atomically should override this so a failure
    /// leaves none of the records behind.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if any record could not be written.
    fn append_versions(&self, versions: &[EntityVersion]) -> Result<(), VgError> {
        versions.iter().try_for_each(|v| self.append_version(v))
    }

    /// Persist a branch record
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the record could not be written.
    fn append_branch(&self, branch: &Branch) -> Result<(), VgError>;
}

/// Journal that keeps nothing (pure in-memory operation and tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopJournal;

impl VersionJournal for NoopJournal {
    fn append_version(&self, _version: &EntityVersion) -> Result<(), VgError> {
        Ok(())
    }

    fn append_branch(&self, _branch: &Branch) -> Result<(), VgError> {
        Ok(())
    }
}

/// Head expectation checked atomically with the write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Precondition {
    /// Write on top of whatever the tip is
    #[default]
    Any,
    /// Tip must be exactly this version (`None` = no version visible yet)
    Expect(Option<String>),
}

/// Everything the store needs to mint one version
#[derive(Debug, Clone)]
pub struct VersionDraft {
    /// Existing identity; `None` mints a new canonical id
    pub canonical_id: Option<String>,
    pub branch_id: Option<String>,
    pub content: EntityContent,
    pub tombstone: bool,
    /// Source version when the write is a merge copy
    pub merged_from: Option<String>,
    pub precondition: Precondition,
}

impl VersionDraft {
    /// Draft for a brand new entity
    pub fn create(branch_id: Option<String>, content: EntityContent) -> Self {
        Self {
            canonical_id: None,
            branch_id,
            content,
            tombstone: false,
            merged_from: None,
            precondition: Precondition::Expect(None),
        }
    }

    /// Draft for a new version of an existing entity
    pub fn revise(
        canonical_id: impl Into<String>,
        branch_id: Option<String>,
        content: EntityContent,
    ) -> Self {
        Self {
            canonical_id: Some(canonical_id.into()),
            branch_id,
            content,
            tombstone: false,
            merged_from: None,
            precondition: Precondition::Any,
        }
    }

    pub fn tombstone(mut self) -> Self {
        self.tombstone = true;
        self
    }

    pub fn expecting(mut self, precondition: Precondition) -> Self {
        self.precondition = precondition;
        self
    }

    pub fn merged_from(mut self, version_id: impl Into<String>) -> Self {
        self.merged_from = Some(version_id.into());
        self
    }
}
