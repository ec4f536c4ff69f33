use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vgraph_core_types::schema::MAIN_BRANCH;

/// A named isolation scope
///
/// A branch sees its own writes plus its parent's state as of `fork_seq`.
/// `main` is implicit and never stored as a `Branch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch id (UUID v7)
    pub id: String,

    /// Unique human-readable name
    pub name: String,

    /// Parent branch id (`None` = main)
    pub parent_branch_id: Option<String>,

    /// Last global write sequence visible from the parent
    pub fork_seq: u64,

    pub created_at: DateTime<Utc>,
}

/// Internal key of a branch: its id, or `"main"` for the default branch
pub fn branch_key(branch_id: Option<&str>) -> &str {
    branch_id.unwrap_or(MAIN_BRANCH)
}

/// Normalize a client-supplied branch id: blank and `"main"` mean the default branch
pub fn normalize_branch_id(branch_id: Option<String>) -> Option<String> {
    branch_id
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty() && b != MAIN_BRANCH)
}
