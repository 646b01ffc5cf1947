//! Cycle analysis over a lock graph using petgraph.
//!
//! Builds a directed graph from the diagram's edges (minus the excluded
//! ones) and runs Tarjan's SCC algorithm. A strongly connected component
//! is cyclic when it has more than one node, or when its single node has a
//! self loop.

use crate::domain::{CycleMembership, Diagram, ElementId, ExclusionSet};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Compute which nodes and edges lie on at least one cycle once
/// `exclusions` are removed.
///
/// Edge endpoints that name no node element are treated as nodes anyway.
/// Edges missing an endpoint are skipped.
#[must_use]
pub fn cycle_membership(diagram: &Diagram, exclusions: &ExclusionSet) -> CycleMembership {
    let mut graph: DiGraph<ElementId, ElementId> = DiGraph::new();
    let mut node_map: HashMap<ElementId, NodeIndex> = HashMap::new();

    let mut node_index = |graph: &mut DiGraph<ElementId, ElementId>, id: &ElementId| {
        *node_map
            .entry(id.clone())
            .or_insert_with(|| graph.add_node(id.clone()))
    };

    for node in diagram.nodes() {
        node_index(&mut graph, &node.id);
    }

    for edge in diagram.edges() {
        if exclusions.contains(&edge.id) {
            continue;
        }
        let (Some(source), Some(target)) = (&edge.source, &edge.target) else {
            warn!(edge = %edge.id, "Edge has no endpoints; skipping");
            continue;
        };
        let from = node_index(&mut graph, source);
        let to = node_index(&mut graph, target);
        graph.add_edge(from, to, edge.id.clone());
    }

    // Component id per node, for cyclic components only.
    let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
    let mut membership = CycleMembership::default();

    for (component, scc) in algo::tarjan_scc(&graph).into_iter().enumerate() {
        let cyclic = match scc.as_slice() {
            [single] => graph.find_edge(*single, *single).is_some(),
            _ => true,
        };
        if !cyclic {
            continue;
        }
        for index in scc {
            component_of.insert(index, component);
            membership.nodes.insert(graph[index].clone());
        }
    }

    membership.edges = graph
        .edge_indices()
        .filter_map(|edge| {
            let (from, to) = graph.edge_endpoints(edge)?;
            let same = component_of.get(&from)? == component_of.get(&to)?;
            same.then(|| graph[edge].clone())
        })
        .collect::<BTreeSet<_>>();

    debug!(
        nodes = membership.nodes.len(),
        edges = membership.edges.len(),
        excluded = exclusions.len(),
        "Computed cycle membership"
    );
    membership
}
