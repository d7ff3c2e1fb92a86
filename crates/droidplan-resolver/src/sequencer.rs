//! Plugin application order.
//!
//! Node `i` of the graph is the plugin declared at position `i`, and an edge
//! `a -> b` means `a` must be applied before `b`. Kahn's algorithm with a
//! min-heap of indices makes declaration order the tie-breaker.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use droidplan_core::plugin::PluginDeclaration;
use droidplan_util::errors::{DroidplanError, ResolveResult};

/// Order plugin ids so that every plugin comes after everything it depends on.
pub fn order(plugins: &[PluginDeclaration]) -> ResolveResult<Vec<String>> {
    let mut index = BTreeMap::new();
    for (i, plugin) in plugins.iter().enumerate() {
        if index.insert(plugin.id.as_str(), i).is_some() {
            return Err(DroidplanError::Descriptor {
                message: format!("Plugin '{}' is declared more than once", plugin.id),
            });
        }
    }

    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(plugins.len(), 0);
    for i in 0..plugins.len() {
        graph.add_node(i);
    }
    for (i, plugin) in plugins.iter().enumerate() {
        for dep in &plugin.depends_on {
            let Some(&d) = index.get(dep.as_str()) else {
                return Err(DroidplanError::UnknownPluginDependency {
                    plugin: plugin.id.clone(),
                    dependency: dep.clone(),
                });
            };
            graph.update_edge(NodeIndex::new(d), NodeIndex::new(i), ());
        }
    }

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut ordered = Vec::with_capacity(plugins.len());
    while let Some(Reverse(i)) = ready.pop() {
        ordered.push(plugins[i].id.clone());
        for next in graph.neighbors_directed(NodeIndex::new(i), Direction::Outgoing) {
            let n = next.index();
            in_degree[n] -= 1;
            if in_degree[n] == 0 {
                ready.push(Reverse(n));
            }
        }
    }

    if ordered.len() < plugins.len() {
        return Err(DroidplanError::PluginCycle {
            cycle: find_cycle(&graph, plugins),
        });
    }
    tracing::debug!("plugin order: {}", ordered.join(" -> "));
    Ok(ordered)
}

/// One concrete cycle, starting at the earliest-declared plugin on it and
/// listed in application order.
fn find_cycle(graph: &DiGraph<usize, ()>, plugins: &[PluginDeclaration]) -> Vec<String> {
    let Some(scc) = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .min_by_key(|scc| scc.iter().map(|n| n.index()).min())
    else {
        return Vec::new();
    };
    let start = scc.iter().map(|n| n.index()).min().unwrap_or_default();

    // Walk predecessors inside the component until we return to `start`,
    // then reverse so the cycle reads in application order.
    let mut path = vec![start];
    let mut visited = vec![false; plugins.len()];
    visited[start] = true;
    if !walk_back(graph, &scc, start, start, &mut path, &mut visited) {
        return vec![plugins[start].id.clone()];
    }
    path[1..].reverse();
    path.into_iter().map(|i| plugins[i].id.clone()).collect()
}

fn walk_back(
    graph: &DiGraph<usize, ()>,
    scc: &[NodeIndex],
    start: usize,
    at: usize,
    path: &mut Vec<usize>,
    visited: &mut [bool],
) -> bool {
    let mut preds: Vec<usize> = graph
        .neighbors_directed(NodeIndex::new(at), Direction::Incoming)
        .map(|n| n.index())
        .filter(|i| scc.contains(&NodeIndex::new(*i)))
        .collect();
    preds.sort_unstable();
    for p in preds {
        if p == start {
            return true;
        }
        if visited[p] {
            continue;
        }
        visited[p] = true;
        path.push(p);
        if walk_back(graph, scc, start, p, path, visited) {
            return true;
        }
        path.pop();
    }
    false
}
