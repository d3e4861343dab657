//! Column implication graph for a single fact or dimension.
//!
//! An edge `A -> B` means that once `A` is grouped, `B`'s value is already
//! determined and need not be grouped as well. Edges are one-directional;
//! [`HierarchyGraph::bidirectional`] registers both directions.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Directed "column A implies column B" graph.
#[derive(Debug, Clone, Default)]
pub struct HierarchyGraph {
    graph: DiGraph<String, ()>,

    /// Index: column name -> NodeIndex
    node_index: HashMap<String, NodeIndex>,
}

impl HierarchyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.node_index.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        idx
    }

    /// Register `element -> other` for every name in `others`.
    ///
    /// Targets that were never declared are created without outgoing edges.
    pub fn implies(&mut self, element: &str, others: &[&str]) -> &mut Self {
        let from = self.node(element);
        for other in others {
            let to = self.node(other);
            self.graph.update_edge(from, to, ());
        }
        self
    }

    /// Register `a -> b` and `b -> a`.
    pub fn bidirectional(&mut self, a: &str, b: &str) -> &mut Self {
        self.implies(a, &[b]);
        self.implies(b, &[a])
    }

    /// Transitive closure of `name`'s outgoing edges.
    ///
    /// `name` itself is only included when a cycle leads back to it. Each
    /// node is expanded at most once, so cyclic graphs terminate. Unknown
    /// names yield an empty set.
    pub fn implications(&self, name: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        let Some(&start) = self.node_index.get(name) else {
            return result;
        };

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut stack: Vec<NodeIndex> = self.graph.neighbors(start).collect();

        while let Some(idx) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            result.insert(self.graph[idx].clone());
            stack.extend(self.graph.neighbors(idx));
        }

        result
    }

    /// Whether grouping on `a` makes grouping on `b` redundant.
    pub fn determines(&self, a: &str, b: &str) -> bool {
        a != b && self.implications(a).contains(b)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Every element mentioned in the graph, declared or implied.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }
}
