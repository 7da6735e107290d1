use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::types::ServiceName;

/// Node in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: ServiceName,
}

/// Directed graph of services and the services they call.
///
/// Nodes keep insertion order: every key of the input mapping first, in the
/// order given, followed by names that only appear as dependency targets.
/// Edges are unique per (caller, callee) pair and keep first-occurrence order.
///
/// A graph is only built through [`DependencyGraph::from_mapping`] or
/// [`DependencyGraph::from_map`], which validate every name, and is read-only
/// afterwards:
///
/// ```compile_fail
/// use meshscan_core::{DependencyGraph, ServiceName};
///
/// let mut graph = DependencyGraph::from_mapping([("a", vec!["b"])]).unwrap();
/// graph.add_dependency(&ServiceName::from(""), &ServiceName::from("a"));
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, ()>,
    index: HashMap<ServiceName, NodeIndex>,
}

impl DependencyGraph {
    fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Build a graph from `(service, dependencies)` pairs.
    ///
    /// Repeated dependencies are folded into a single edge. A key listed twice
    /// has its dependency lists merged.
    pub fn from_mapping<I, K, D, S>(mapping: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (K, D)>,
        K: AsRef<str>,
        D: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<(ServiceName, Vec<ServiceName>)> = Vec::new();
        for (service, deps) in mapping {
            let service = service.as_ref();
            if service.trim().is_empty() {
                return Err(GraphError::EmptyServiceName);
            }
            let mut targets = Vec::new();
            for dep in deps {
                let dep = dep.as_ref();
                if dep.trim().is_empty() {
                    return Err(GraphError::EmptyDependencyName {
                        dependent: service.to_string(),
                    });
                }
                targets.push(ServiceName::from(dep));
            }
            entries.push((ServiceName::from(service), targets));
        }

        let mut graph = Self::new();
        for (service, _) in &entries {
            graph.ensure_node(service);
        }
        for (service, targets) in &entries {
            for target in targets {
                graph.add_dependency(service, target);
            }
        }

        tracing::debug!(
            services = graph.node_count(),
            dependencies = graph.edge_count(),
            "built dependency graph"
        );
        Ok(graph)
    }

    /// Build from a sorted map; nodes follow key order.
    pub fn from_map(mapping: &BTreeMap<String, Vec<String>>) -> Result<Self, GraphError> {
        Self::from_mapping(mapping.iter())
    }

    /// Ensure a service exists as a node. Returns the node index.
    fn ensure_node(&mut self, name: &ServiceName) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode { name: name.clone() });
        self.index.insert(name.clone(), idx);
        idx
    }

    /// Add a `from -> to` edge unless it already exists.
    fn add_dependency(&mut self, from: &ServiceName, to: &ServiceName) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&ServiceName::from(name))
    }

    /// All service names in node order.
    pub fn service_names(&self) -> Vec<&ServiceName> {
        self.graph.node_weights().map(|n| &n.name).collect()
    }

    /// Outgoing dependencies of `name` in declaration order. Unknown names and
    /// target-only services have none.
    pub fn successors(&self, name: &str) -> Vec<&ServiceName> {
        match self.index.get(&ServiceName::from(name)) {
            Some(&idx) => self
                .successor_indices(idx)
                .into_iter()
                .map(|s| &self.graph[s].name)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Services that depend on `name`, in edge insertion order.
    pub fn predecessors(&self, name: &str) -> Vec<&ServiceName> {
        let Some(&idx) = self.index.get(&ServiceName::from(name)) else {
            return Vec::new();
        };
        let mut incoming: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.id(), e.source()))
            .collect();
        incoming.sort_by_key(|(id, _)| *id);
        incoming
            .into_iter()
            .map(|(_, s)| &self.graph[s].name)
            .collect()
    }

    /// Every edge as `(caller, callee)`, in insertion order.
    pub fn edges(&self) -> Vec<(&ServiceName, &ServiceName)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()].name, &self.graph[e.target()].name))
            .collect()
    }

    pub(crate) fn name(&self, idx: NodeIndex) -> &ServiceName {
        &self.graph[idx].name
    }

    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Successor lists for every node, indexed by `NodeIndex::index()`.
    pub(crate) fn adjacency(&self) -> Vec<Vec<NodeIndex>> {
        self.graph
            .node_indices()
            .map(|idx| self.successor_indices(idx))
            .collect()
    }

    pub(crate) fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    pub(crate) fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    // petgraph walks a node's edges newest-first; sort back to declaration order.
    fn successor_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut outgoing: Vec<_> = self
            .graph
            .edges(idx)
            .map(|e| (e.id(), e.target()))
            .collect();
        outgoing.sort_by_key(|(id, _)| *id);
        outgoing.into_iter().map(|(_, t)| t).collect()
    }
}

impl Default for DependencyGraph {
    /// The empty graph.
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: Vec<&ServiceName>) -> Vec<&str> {
        list.into_iter().map(ServiceName::as_str).collect()
    }

    #[test]
    fn test_implicit_nodes_from_targets() {
        let graph = DependencyGraph::from_mapping([("a", vec!["b", "c"])]).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(names(graph.service_names()), vec!["a", "b", "c"]);
        assert!(graph.successors("b").is_empty());
        assert!(graph.contains("c"));
    }

    #[test]
    fn test_keys_come_before_target_only_nodes() {
        let graph =
            DependencyGraph::from_mapping([("a", vec!["z"]), ("b", vec!["a"])]).unwrap();
        assert_eq!(names(graph.service_names()), vec!["a", "b", "z"]);
    }

    #[test]
    fn test_successors_keep_declaration_order() {
        let graph = DependencyGraph::from_mapping([("a", vec!["d", "b", "c"])]).unwrap();
        assert_eq!(names(graph.successors("a")), vec!["d", "b", "c"]);
    }

    #[test]
    fn test_duplicate_dependencies_are_folded() {
        let graph = DependencyGraph::from_mapping([("a", vec!["b", "b", "c", "b"])]).unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(names(graph.successors("a")), vec!["b", "c"]);
    }

    #[test]
    fn test_repeated_key_merges_lists() {
        let graph =
            DependencyGraph::from_mapping([("a", vec!["b"]), ("a", vec!["c", "b"])]).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(names(graph.successors("a")), vec!["b", "c"]);
    }

    #[test]
    fn test_unknown_service_has_no_successors() {
        let graph = DependencyGraph::from_mapping([("a", vec!["b"])]).unwrap();
        assert!(graph.successors("missing").is_empty());
        assert!(graph.predecessors("missing").is_empty());
    }

    #[test]
    fn test_predecessors() {
        let graph =
            DependencyGraph::from_mapping([("a", vec!["c"]), ("b", vec!["c"])]).unwrap();
        assert_eq!(names(graph.predecessors("c")), vec!["a", "b"]);
    }

    #[test]
    fn test_self_edge_is_kept() {
        let graph = DependencyGraph::from_mapping([("a", vec!["a"])]).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(names(graph.successors("a")), vec!["a"]);
    }

    #[test]
    fn test_empty_service_name_rejected() {
        let err = DependencyGraph::from_mapping([("  ", vec!["b"])]).unwrap_err();
        assert!(matches!(err, GraphError::EmptyServiceName));
    }

    #[test]
    fn test_empty_dependency_name_rejected() {
        let err = DependencyGraph::from_mapping([("a", vec!["b", ""])]).unwrap_err();
        assert!(
            matches!(err, GraphError::EmptyDependencyName { ref dependent } if dependent == "a")
        );
    }

    #[test]
    fn test_from_map_uses_key_order() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), vec!["a".to_string()]);
        map.insert("a".to_string(), vec![]);
        let graph = DependencyGraph::from_map(&map).unwrap();
        assert_eq!(names(graph.service_names()), vec!["a", "b"]);
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_invalid_target_rejects_whole_mapping() {
        // the empty name sits behind a valid key; nothing is built
        let err = DependencyGraph::from_mapping([("a", vec!["b"]), ("b", vec![" "])]).unwrap_err();
        assert!(
            matches!(err, GraphError::EmptyDependencyName { ref dependent } if dependent == "b")
        );
        assert!(DependencyGraph::default().is_empty());
    }

    #[test]
    fn test_empty_mapping() {
        let graph = DependencyGraph::from_mapping(Vec::<(&str, Vec<&str>)>::new()).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }
}
