use super::walker::{HopFilter, Walker};
use super::{check_bounds, check_depth, ExpandRequest, ExpandResult, TraversalLimits};
use crate::errors::Result;
use crate::model::{branch_key, normalize_branch_id};
use crate::store::VersionStore;

/// Breadth-first neighbourhood of the roots
///
/// # Errors
/// * `Validation` - empty roots or zero `max_nodes`
/// * `LimitExceeded` - a requested bound above the hard caps
/// * `NotFound` - a root is not a live object on the branch
/// * `BranchNotFound` - unknown branch
pub fn expand(
    store: &VersionStore,
    req: &ExpandRequest,
    limits: &TraversalLimits,
) -> Result<ExpandResult> {
    check_bounds(req.root_ids.len(), req.max_nodes, req.max_edges, limits)?;
    check_depth(req.max_depth, limits)?;
    let branch_id = normalize_branch_id(req.branch_id.clone());
    let branch = branch_key(branch_id.as_deref());
    store.require_branch(branch)?;

    let filter = HopFilter {
        direction: req.direction,
        relationship_types: req.relationship_types.as_deref(),
        object_types: req.object_types.as_deref(),
        labels: req.labels.as_deref(),
    };

    let mut walker = Walker::new(store, branch, req.max_nodes, req.max_edges);
    let roots = walker.seed(&req.root_ids)?;
    let walk = walker.walk(roots, &filter, req.max_depth);

    Ok(ExpandResult {
        nodes: walker.nodes.into_iter().cloned().collect(),
        edges: walker.edges.into_iter().cloned().collect(),
        truncated: walker.truncated,
        max_depth_reached: walk.max_depth_reached,
    })
}
