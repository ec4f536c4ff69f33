//! vgraph Core - versioned property-graph kernel
//!
//! This crate holds the synchronous domain logic of the graph store:
//! - Dual-identity version model (stable canonical id, immutable version id)
//! - Version store with branch-scoped head resolution and derived indexes
//! - Mutation gateway: validation, key uniqueness, referential integrity, bulk results
//! - Three-way branch merge (classification and per-item apply)
//! - Bounded traversal and filtered search
//!
//! Nothing here is async or locked; the engine crate owns concurrency and
//! persistence is plugged in through [`store::VersionJournal`].

pub mod cursor;
pub mod errors;
pub mod gateway;
pub mod logging_facility;
pub mod merge;
pub mod model;
pub mod search;
pub mod store;
pub mod traversal;

// Used by the exported logging macros
pub use vgraph_core_types;

// Re-export commonly used types
pub use errors::{GraphError, Result, VgError, VgErrorKind};
pub use merge::{MergeItem, MergeReport, MergeRequest, MergeStatus};
pub use model::{Branch, EntityContent, EntityKind, EntityVersion, Properties};
pub use store::{NoopJournal, Precondition, VersionDraft, VersionJournal, VersionStore};
pub use traversal::TraversalLimits;
