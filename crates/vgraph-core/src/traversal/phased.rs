use std::collections::HashSet;

use super::walker::{HopFilter, Walker};
use super::{
    check_bounds, check_depth, PhaseSummary, TraversalLimits, TraverseRequest, TraverseResult,
};
use crate::cursor::{decode_offset, encode_offset};
use crate::errors::{GraphError, Result};
use crate::model::{branch_key, normalize_branch_id};
use crate::store::VersionStore;

/// Multi-phase traversal with paging over the discovered nodes
///
/// Phase N starts from the nodes phase N-1 discovered (phase 0 from the
/// roots). The walk is recomputed on every page, so a cursor is only an
/// offset into a deterministic node list.
///
/// # Errors
/// * `Validation` - empty roots or phases, zero limit, bad cursor
/// * `LimitExceeded` - bound above the hard caps
/// * `NotFound` - a root is not a live object
pub fn traverse(
    store: &VersionStore,
    req: &TraverseRequest,
    limits: &TraversalLimits,
) -> Result<TraverseResult> {
    check_bounds(req.root_ids.len(), req.max_nodes, req.max_edges, limits)?;
    if req.phases.is_empty() {
        return Err(GraphError::validation("phases must not be empty"));
    }
    for phase in &req.phases {
        check_depth(phase.max_depth, limits)?;
    }
    let page_size = req.limit.unwrap_or(req.max_nodes);
    if page_size == 0 {
        return Err(GraphError::validation("limit must be positive"));
    }
    let offset = req.cursor.as_deref().map(decode_offset).transpose()?.unwrap_or(0);

    let branch_id = normalize_branch_id(req.branch_id.clone());
    let branch = branch_key(branch_id.as_deref());
    store.require_branch(branch)?;

    let mut walker = Walker::new(store, branch, req.max_nodes, req.max_edges);
    let mut frontier = walker.seed(&req.root_ids)?;
    let mut phases = Vec::with_capacity(req.phases.len());
    for (index, phase) in req.phases.iter().enumerate() {
        let filter = HopFilter {
            direction: phase.direction,
            relationship_types: phase.relationship_types.as_deref(),
            object_types: phase.object_types.as_deref(),
            labels: phase.labels.as_deref(),
        };
        let walk = walker.walk(frontier, &filter, phase.max_depth);
        phases.push(PhaseSummary {
            phase: index,
            discovered: walk.discovered.len(),
            max_depth_reached: walk.max_depth_reached,
        });
        frontier = walk.discovered;
    }

    let total_nodes = walker.nodes.len();
    let start = offset.min(total_nodes);
    let end = start.saturating_add(page_size).min(total_nodes);
    let page = &walker.nodes[start..end];
    let page_ids: HashSet<&str> = page.iter().map(|n| n.canonical_id.as_str()).collect();
    let edges = walker
        .edges
        .iter()
        .filter(|e| {
            e.endpoints()
                .is_some_and(|(src, dst)| page_ids.contains(src) || page_ids.contains(dst))
        })
        .map(|e| (*e).clone())
        .collect();

    let has_more = end < total_nodes;
    Ok(TraverseResult {
        nodes: page.iter().map(|n| (*n).clone()).collect(),
        edges,
        phases,
        total_nodes,
        truncated: walker.truncated,
        has_more,
        next_cursor: has_more.then(|| encode_offset(end)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{create_object, create_relationship};
    use crate::gateway::{CreateObjectRequest, CreateRelationshipRequest};
    use crate::model::EntityVersion;
    use crate::store::NoopJournal;
    use crate::traversal::{Direction, TraversePhase};

    fn node(store: &mut VersionStore, entity_type: &str) -> EntityVersion {
        create_object(
            store,
            &NoopJournal,
            CreateObjectRequest {
                entity_type: entity_type.into(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn edge(store: &mut VersionStore, t: &str, a: &EntityVersion, b: &EntityVersion) {
        create_relationship(
            store,
            &NoopJournal,
            CreateRelationshipRequest {
                entity_type: t.into(),
                src_id: a.canonical_id.clone(),
                dst_id: b.canonical_id.clone(),
                ..Default::default()
            },
        )
        .unwrap();
    }

    fn phase(rel: &str) -> TraversePhase {
        TraversePhase {
            relationship_types: Some(vec![rel.to_string()]),
            direction: Direction::Outgoing,
            max_depth: 1,
            ..Default::default()
        }
    }

    fn request(roots: Vec<String>, phases: Vec<TraversePhase>) -> TraverseRequest {
        TraverseRequest {
            root_ids: roots,
            phases,
            max_nodes: 100,
            max_edges: 100,
            limit: None,
            cursor: None,
            branch_id: None,
        }
    }

    /// person -works_at-> company -located_in-> city, plus person -lives_in-> city2
    fn world(store: &mut VersionStore) -> (EntityVersion, EntityVersion, EntityVersion, EntityVersion) {
        let person = node(store, "Person");
        let company = node(store, "Company");
        let city = node(store, "City");
        let home = node(store, "City");
        edge(store, "works_at", &person, &company);
        edge(store, "located_in", &company, &city);
        edge(store, "lives_in", &person, &home);
        (person, company, city, home)
    }

    #[test]
    fn test_phases_chain_from_previous_discoveries() {
        let mut store = VersionStore::new();
        let (person, company, city, _home) = world(&mut store);

        let req = request(
            vec![person.canonical_id.clone()],
            vec![phase("works_at"), phase("located_in")],
        );
        let result = traverse(&store, &req, &TraversalLimits::default()).unwrap();

        let ids: Vec<&str> = result.nodes.iter().map(|n| n.canonical_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                person.canonical_id.as_str(),
                company.canonical_id.as_str(),
                city.canonical_id.as_str()
            ]
        );
        assert_eq!(result.phases[0].discovered, 1);
        assert_eq!(result.phases[1].discovered, 1);
        assert!(!result.has_more);
    }

    #[test]
    fn test_second_phase_does_not_restart_from_roots() {
        let mut store = VersionStore::new();
        let (person, _company, _city, _home) = world(&mut store);

        // lives_in only leaves the person, who is not a phase-1 discovery
        let req = request(
            vec![person.canonical_id.clone()],
            vec![phase("works_at"), phase("lives_in")],
        );
        let result = traverse(&store, &req, &TraversalLimits::default()).unwrap();
        assert_eq!(result.total_nodes, 2);
        assert_eq!(result.phases[1].discovered, 0);
    }

    #[test]
    fn test_paging_with_cursor() {
        let mut store = VersionStore::new();
        let hub = node(&mut store, "Hub");
        for _ in 0..5 {
            let leaf = node(&mut store, "Leaf");
            edge(&mut store, "has", &hub, &leaf);
        }

        let mut req = request(vec![hub.canonical_id.clone()], vec![phase("has")]);
        req.limit = Some(4);
        let first = traverse(&store, &req, &TraversalLimits::default()).unwrap();
        assert_eq!(first.nodes.len(), 4);
        assert_eq!(first.total_nodes, 6);
        assert!(first.has_more);
        assert_eq!(first.edges.len(), 5);

        req.cursor = first.next_cursor.clone();
        let second = traverse(&store, &req, &TraversalLimits::default()).unwrap();
        assert_eq!(second.nodes.len(), 2);
        assert!(!second.has_more);
        assert!(second.next_cursor.is_none());
        assert_eq!(second.edges.len(), 2);
    }

    #[test]
    fn test_empty_phases_rejected() {
        let store = VersionStore::new();
        let req = request(vec!["x".into()], Vec::new());
        assert!(matches!(
            traverse(&store, &req, &TraversalLimits::default()),
            Err(GraphError::Validation { .. })
        ));
    }
}
