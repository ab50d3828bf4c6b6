//! Graph of dependency edges discovered while walking descriptors
//!
//! Nodes are dependency keys, edges carry the scope of the declaration. The
//! graph answers reachability questions for main/test classification and
//! reports cycles for diagnostics.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use std::collections::{BTreeSet, HashMap};
use sysdeps_core::{DependencyKey, Scope};

/// Directed graph of `declaring key -> declared key`
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<DependencyKey, Scope>,
    node_map: HashMap<DependencyKey, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning the existing index if the key is already present
    pub fn add_artifact(&mut self, key: &DependencyKey) -> NodeIndex {
        if let Some(index) = self.node_map.get(key) {
            return *index;
        }
        let index = self.graph.add_node(key.clone());
        self.node_map.insert(key.clone(), index);
        index
    }

    /// Record that `from` declares `to`, adding missing nodes
    pub fn add_dependency(&mut self, from: &DependencyKey, to: &DependencyKey, scope: Scope) {
        let from = self.add_artifact(from);
        let to = self.add_artifact(to);
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, scope);
        }
    }

    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.node_map.contains_key(key)
    }

    /// Every key reachable from any of `roots`, roots included
    pub fn reachable_from<'a, I>(&self, roots: I) -> BTreeSet<DependencyKey>
    where
        I: IntoIterator<Item = &'a DependencyKey>,
    {
        let mut reached = BTreeSet::new();
        for root in roots {
            let Some(&start) = self.node_map.get(root) else {
                continue;
            };
            if reached.contains(root) {
                continue;
            }
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(node) = bfs.next(&self.graph) {
                reached.insert(self.graph[node].clone());
            }
        }
        reached
    }

    /// Groups of keys that depend on each other, each sorted, largest first
    pub fn cycles(&self) -> Vec<Vec<DependencyKey>> {
        let mut cycles: Vec<Vec<DependencyKey>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut keys: Vec<DependencyKey> =
                    component.into_iter().map(|n| self.graph[n].clone()).collect();
                keys.sort();
                keys
            })
            .collect();
        cycles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        cycles
    }

    /// Format a cycle as "a -> b -> a"
    pub fn format_cycle(cycle: &[DependencyKey]) -> String {
        let mut names: Vec<String> = cycle.iter().map(ToString::to_string).collect();
        if let Some(first) = names.first().cloned() {
            names.push(first);
        }
        names.join(" -> ")
    }

    pub fn artifact_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn reachability_is_closed_under_edges(
            num_nodes in 2usize..10,
            edges in prop::collection::vec((0usize..10, 0usize..10), 0..25),
        ) {
            let keys: Vec<DependencyKey> =
                (0..num_nodes).map(|i| DependencyKey::new("g", format!("a{i}"))).collect();
            let mut graph = DependencyGraph::new();
            for key in &keys {
                graph.add_artifact(key);
            }
            let mut added = Vec::new();
            for (from, to) in edges {
                if from < num_nodes && to < num_nodes {
                    graph.add_dependency(&keys[from], &keys[to], Scope::Compile);
                    added.push((from, to));
                }
            }

            let reached = graph.reachable_from([&keys[0]]);
            prop_assert!(reached.contains(&keys[0]));
            for (from, to) in added {
                if reached.contains(&keys[from]) {
                    prop_assert!(reached.contains(&keys[to]));
                }
            }
        }
    }
}
