use std::collections::HashSet;

use super::Direction;
use crate::errors::{GraphError, Result};
use crate::model::{EntityKind, EntityVersion};
use crate::store::{Adjacency, VersionStore};

/// Hop filters; `None` means "anything"
pub(crate) struct HopFilter<'r> {
    pub direction: Direction,
    pub relationship_types: Option<&'r [String]>,
    pub object_types: Option<&'r [String]>,
    pub labels: Option<&'r [String]>,
}

impl HopFilter<'_> {
    fn accepts_edge(&self, edge: &EntityVersion) -> bool {
        self.relationship_types
            .map_or(true, |types| types.iter().any(|t| t == edge.entity_type()))
    }

    fn accepts_node(&self, node: &EntityVersion) -> bool {
        let type_ok = self
            .object_types
            .map_or(true, |types| types.iter().any(|t| t == node.entity_type()));
        let label_ok = self
            .labels
            .map_or(true, |labels| labels.iter().any(|l| node.content.labels.contains(l)));
        type_ok && label_ok
    }
}

/// Result of walking one hop pattern
pub(crate) struct Walk<'a> {
    pub discovered: Vec<&'a str>,
    pub max_depth_reached: usize,
}

/// BFS state shared across phases of one traversal
pub(crate) struct Walker<'a> {
    store: &'a VersionStore,
    branch: &'a str,
    max_nodes: usize,
    max_edges: usize,
    pub nodes: Vec<&'a EntityVersion>,
    pub edges: Vec<&'a EntityVersion>,
    visited: HashSet<&'a str>,
    seen_edges: HashSet<&'a str>,
    pub truncated: bool,
}

impl<'a> Walker<'a> {
    pub fn new(store: &'a VersionStore, branch: &'a str, max_nodes: usize, max_edges: usize) -> Self {
        Self {
            store,
            branch,
            max_nodes,
            max_edges,
            nodes: Vec::new(),
            edges: Vec::new(),
            visited: HashSet::new(),
            seen_edges: HashSet::new(),
            truncated: false,
        }
    }

    /// Resolve root ids to live objects and seed the node list
    ///
    /// Roots count toward `max_nodes` but are never filtered.
    pub fn seed(&mut self, root_ids: &[String]) -> Result<Vec<&'a str>> {
        let mut seeded = Vec::new();
        for root in root_ids {
            let store = self.store;
            let head = store
                .canonical_of(root)
                .and_then(|(canonical, _)| store.resolve_head(canonical, self.branch))
                .filter(|head| head.kind() == EntityKind::Object)
                .ok_or_else(|| GraphError::NotFound {
                    id: root.clone(),
                    branch: self.branch.to_string(),
                })?;
            if self.visited.contains(head.canonical_id.as_str()) {
                continue;
            }
            if self.nodes.len() >= self.max_nodes {
                self.truncated = true;
                break;
            }
            self.add_node(head);
            seeded.push(head.canonical_id.as_str());
        }
        Ok(seeded)
    }

    fn add_node(&mut self, node: &'a EntityVersion) {
        self.visited.insert(node.canonical_id.as_str());
        self.nodes.push(node);
    }

    /// Walk up to `max_depth` hops from `start`, stopping at the first bound hit
    pub fn walk(&mut self, start: Vec<&'a str>, filter: &HopFilter<'_>, max_depth: usize) -> Walk<'a> {
        let mut discovered = Vec::new();
        let mut max_depth_reached = 0;
        let mut frontier = start;

        for depth in 1..=max_depth {
            if frontier.is_empty() || self.truncated {
                break;
            }
            let mut next = Vec::new();
            for node_id in frontier {
                for (edge, neighbour) in self.hops(node_id, filter) {
                    let new_node = !self.visited.contains(neighbour.canonical_id.as_str());
                    let new_edge = !self.seen_edges.contains(edge.canonical_id.as_str());
                    if (new_node && self.nodes.len() >= self.max_nodes)
                        || (new_edge && self.edges.len() >= self.max_edges)
                    {
                        self.truncated = true;
                        break;
                    }
                    if new_node {
                        self.add_node(neighbour);
                        next.push(neighbour.canonical_id.as_str());
                        discovered.push(neighbour.canonical_id.as_str());
                        max_depth_reached = depth;
                    }
                    if new_edge {
                        self.seen_edges.insert(edge.canonical_id.as_str());
                        self.edges.push(edge);
                    }
                }
                if self.truncated {
                    break;
                }
            }
            frontier = next;
        }

        Walk {
            discovered,
            max_depth_reached,
        }
    }

    /// Live edges from `node_id` and their live, accepted far ends, in
    /// relationship id order (outgoing first)
    fn hops(&self, node_id: &str, filter: &HopFilter<'_>) -> Vec<(&'a EntityVersion, &'a EntityVersion)> {
        let store = self.store;
        let mut out = Vec::new();
        let sides = [
            (Adjacency::Outgoing, filter.direction.follows_outgoing()),
            (Adjacency::Incoming, filter.direction.follows_incoming()),
        ];
        for (side, enabled) in sides {
            if !enabled {
                continue;
            }
            for rel_id in store.relationships_of(node_id, side) {
                let Some(edge) = store.resolve_head(rel_id, self.branch) else {
                    continue;
                };
                if !filter.accepts_edge(edge) {
                    continue;
                }
                let Some((src, dst)) = edge.endpoints() else {
                    continue;
                };
                let far = if side == Adjacency::Outgoing { dst } else { src };
                let Some(neighbour) = store
                    .resolve_head(far, self.branch)
                    .filter(|n| n.kind() == EntityKind::Object)
                else {
                    continue;
                };
                if filter.accepts_node(neighbour) || self.visited.contains(far) {
                    out.push((edge, neighbour));
                }
            }
        }
        out
    }
}
