//! Traversal engine
//!
//! Bounded breadth-first walks over live objects and relationships as seen
//! from one branch. Every bound is checked before a node or edge is added,
//! so results never exceed the request.

mod expand;
mod phased;
mod walker;

use serde::{Deserialize, Serialize};

pub use expand::expand;
pub use phased::traverse;

use crate::errors::{GraphError, Result};
use crate::model::EntityVersion;

/// Hard caps applied to every traversal request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalLimits {
    pub max_depth: usize,
    pub max_nodes: usize,
    pub max_edges: usize,
    pub max_roots: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_nodes: 5000,
            max_edges: 20000,
            max_roots: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
    #[default]
    Both,
}

impl Direction {
    pub(crate) fn follows_outgoing(&self) -> bool {
        matches!(self, Direction::Outgoing | Direction::Both)
    }

    pub(crate) fn follows_incoming(&self) -> bool {
        matches!(self, Direction::Incoming | Direction::Both)
    }
}

fn default_max_depth() -> usize {
    2
}

fn default_max_nodes() -> usize {
    200
}

fn default_max_edges() -> usize {
    1000
}

fn default_phase_depth() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpandRequest {
    pub root_ids: Vec<String>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    #[serde(default = "default_max_edges")]
    pub max_edges: usize,
    #[serde(default)]
    pub relationship_types: Option<Vec<String>>,
    #[serde(default)]
    pub object_types: Option<Vec<String>>,
    /// Neighbours must carry at least one of these labels
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub branch_id: Option<String>,
}

impl ExpandRequest {
    pub fn new(root_ids: Vec<String>) -> Self {
        Self {
            root_ids,
            direction: Direction::default(),
            max_depth: default_max_depth(),
            max_nodes: default_max_nodes(),
            max_edges: default_max_edges(),
            relationship_types: None,
            object_types: None,
            labels: None,
            branch_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpandResult {
    pub nodes: Vec<EntityVersion>,
    pub edges: Vec<EntityVersion>,
    pub truncated: bool,
    pub max_depth_reached: usize,
}

/// One hop pattern of a multi-phase traversal
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraversePhase {
    #[serde(default)]
    pub relationship_types: Option<Vec<String>>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_phase_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub object_types: Option<Vec<String>>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraverseRequest {
    pub root_ids: Vec<String>,
    pub phases: Vec<TraversePhase>,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    #[serde(default = "default_max_edges")]
    pub max_edges: usize,
    /// Page size over the node list
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseSummary {
    pub phase: usize,
    pub discovered: usize,
    pub max_depth_reached: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraverseResult {
    pub nodes: Vec<EntityVersion>,
    pub edges: Vec<EntityVersion>,
    pub phases: Vec<PhaseSummary>,
    pub total_nodes: usize,
    pub truncated: bool,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

fn exceeds(what: &str, requested: usize, max: usize) -> Result<()> {
    if requested > max {
        return Err(GraphError::LimitExceeded {
            what: what.to_string(),
            requested,
            max,
        });
    }
    Ok(())
}

/// Shared request validation against the hard caps
pub(crate) fn check_bounds(
    roots: usize,
    max_nodes: usize,
    max_edges: usize,
    limits: &TraversalLimits,
) -> Result<()> {
    if roots == 0 {
        return Err(GraphError::validation("root_ids must not be empty"));
    }
    if max_nodes == 0 {
        return Err(GraphError::validation("max_nodes must be positive"));
    }
    exceeds("root_ids", roots, limits.max_roots)?;
    exceeds("max_nodes", max_nodes, limits.max_nodes)?;
    exceeds("max_edges", max_edges, limits.max_edges)
}

pub(crate) fn check_depth(depth: usize, limits: &TraversalLimits) -> Result<()> {
    exceeds("max_depth", depth, limits.max_depth)
}
