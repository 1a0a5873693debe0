//! Leaf-level project import graph backed by petgraph::DiGraph.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::tree::{ModuleForest, ModuleId};

/// Directed graph whose nodes are exactly the leaf project modules. Imports
/// targeting non-project or non-leaf modules never appear here; they are
/// handled by the visibility stage.
pub struct ImportGraph {
    graph: DiGraph<ModuleId, ()>,
    node_index: HashMap<ModuleId, NodeIndex>,
}

impl ImportGraph {
    /// Build the graph from a fully linked forest.
    pub fn build(forest: &ModuleForest) -> Self {
        let mut graph = DiGraph::new();
        let mut node_index = HashMap::new();

        for id in forest.ids() {
            let module = forest.get(id);
            if module.is_project() && module.is_leaf() {
                let idx = graph.add_node(id);
                node_index.insert(id, idx);
            }
        }

        for id in forest.ids() {
            let Some(&from) = node_index.get(&id) else { continue };
            for &target in forest.get(id).resolved_imports() {
                if target == id {
                    continue;
                }
                if let Some(&to) = node_index.get(&target) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        Self { graph, node_index }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Leaf project modules with in-degree 0.
    pub fn never_imported(&self) -> Vec<ModuleId> {
        self.graph
            .externals(Direction::Incoming)
            .map(|idx| self.graph[idx])
            .collect()
    }

    /// Leaf project modules with out-degree 0.
    pub fn no_imports(&self) -> Vec<ModuleId> {
        self.graph
            .externals(Direction::Outgoing)
            .map(|idx| self.graph[idx])
            .collect()
    }

    /// Fixed point of the dead-end computation: seeded with the
    /// out-degree-0 set, then any node all of whose successors are already
    /// members joins the set, until nothing changes. Implemented as an
    /// explicit worklist over preallocated membership flags; the resulting
    /// set is independent of frontier order.
    pub fn dead_ends(&self) -> Vec<ModuleId> {
        let n = self.graph.node_count();
        let mut member = vec![false; n];
        let mut worklist: VecDeque<NodeIndex> = VecDeque::new();

        for idx in self.graph.externals(Direction::Outgoing) {
            member[idx.index()] = true;
            worklist.push_back(idx);
        }

        while let Some(u) = worklist.pop_front() {
            for v in self.graph.neighbors_directed(u, Direction::Incoming) {
                if member[v.index()] {
                    continue;
                }
                let all_in = self
                    .graph
                    .neighbors_directed(v, Direction::Outgoing)
                    .all(|s| member[s.index()]);
                if all_in {
                    member[v.index()] = true;
                    worklist.push_back(v);
                }
            }
        }

        self.graph
            .node_indices()
            .filter(|idx| member[idx.index()])
            .map(|idx| self.graph[idx])
            .collect()
    }
}
