//! Depth-first circular dependency detection.
//!
//! Every node is a potential walk root, taken in graph node order. A node is
//! entered at most once across the whole run. While a walk is in progress, the
//! current root-to-node path is tracked together with each path member's
//! position, so reaching a node that is already on the path closes a cycle in
//! constant time. Each such back edge yields exactly one reported cycle.
//!
//! The walk keeps an explicit frame stack instead of recursing, so long
//! dependency chains cannot exhaust the thread stack.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::graph::DependencyGraph;
use crate::types::{Cycle, ServiceName};

/// Outcome of a full cycle search.
#[derive(Debug, Clone)]
pub struct CycleSearch {
    /// Cycles in discovery order.
    pub cycles: Vec<Cycle>,
    /// Services entered by the walk, in entry order.
    pub visited: Vec<ServiceName>,
}

/// Finds circular dependencies in a [`DependencyGraph`].
pub struct CycleDetector<'g> {
    graph: &'g DependencyGraph,
}

impl<'g> CycleDetector<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self { graph }
    }

    /// Run the search, returning cycles and the visit order.
    pub fn search(&self) -> CycleSearch {
        let adjacency = self.graph.adjacency();
        let mut traversal = Traversal::new(&adjacency);

        for root in self.graph.node_indices() {
            if !traversal.visited[root.index()] {
                traversal.walk(root);
            }
        }

        let to_names = |nodes: &[NodeIndex]| -> Vec<ServiceName> {
            nodes.iter().map(|&n| self.graph.name(n).clone()).collect()
        };
        let cycles: Vec<Cycle> = traversal
            .cycles
            .iter()
            .map(|c| Cycle(to_names(c)))
            .collect();

        tracing::debug!(
            cycles = cycles.len(),
            visited = traversal.order.len(),
            "cycle search complete"
        );

        CycleSearch {
            cycles,
            visited: to_names(&traversal.order),
        }
    }

    /// Every cycle found, in discovery order. Each back edge closes a
    /// different loop, so one search never reports a rotation twice.
    pub fn detect(&self) -> Vec<Cycle> {
        self.search().cycles
    }

    pub fn has_cycles(&self) -> bool {
        !self.detect().is_empty()
    }
}

/// Merge cycles from several searches, dropping rotations of a loop already
/// seen. The first occurrence is kept as found, and order is preserved.
///
/// Detectors run over different graphs, or over one graph built with another
/// key order, can report the same loop from different entry points:
///
/// ```
/// use meshscan_core::cycles::dedupe_cycles;
/// use meshscan_core::{CycleDetector, DependencyGraph};
///
/// let staging = DependencyGraph::from_mapping([("a", vec!["b"]), ("b", vec!["a"])]).unwrap();
/// let prod = DependencyGraph::from_mapping([("b", vec!["a"]), ("a", vec!["b"])]).unwrap();
///
/// let merged = dedupe_cycles(
///     CycleDetector::new(&staging)
///         .detect()
///         .into_iter()
///         .chain(CycleDetector::new(&prod).detect()),
/// );
/// assert_eq!(merged.len(), 1);
/// ```
pub fn dedupe_cycles(cycles: impl IntoIterator<Item = Cycle>) -> Vec<Cycle> {
    let mut seen = HashSet::new();
    cycles
        .into_iter()
        .filter(|c| seen.insert(c.normalized()))
        .collect()
}

/// Mutable state for one search. Owned by a single `search` call.
struct Traversal<'a> {
    adjacency: &'a [Vec<NodeIndex>],
    visited: Vec<bool>,
    order: Vec<NodeIndex>,
    path: Vec<NodeIndex>,
    /// Position of each node in `path`, `None` when off the current branch.
    on_path: Vec<Option<usize>>,
    cycles: Vec<Vec<NodeIndex>>,
}

struct Frame {
    node: NodeIndex,
    next: usize,
}

impl<'a> Traversal<'a> {
    fn new(adjacency: &'a [Vec<NodeIndex>]) -> Self {
        let n = adjacency.len();
        Self {
            adjacency,
            visited: vec![false; n],
            order: Vec::with_capacity(n),
            path: Vec::new(),
            on_path: vec![None; n],
            cycles: Vec::new(),
        }
    }

    fn walk(&mut self, root: NodeIndex) {
        let adjacency = self.adjacency;
        self.enter(root);
        let mut stack = vec![Frame {
            node: root,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let successors = &adjacency[frame.node.index()];
            match successors.get(frame.next) {
                Some(&succ) => {
                    frame.next += 1;
                    if !self.visited[succ.index()] {
                        self.enter(succ);
                        stack.push(Frame {
                            node: succ,
                            next: 0,
                        });
                    } else if let Some(start) = self.on_path[succ.index()] {
                        let mut cycle = self.path[start..].to_vec();
                        cycle.push(succ);
                        self.cycles.push(cycle);
                    }
                }
                None => {
                    let node = frame.node;
                    stack.pop();
                    self.leave(node);
                }
            }
        }
    }

    fn enter(&mut self, node: NodeIndex) {
        self.visited[node.index()] = true;
        self.order.push(node);
        self.on_path[node.index()] = Some(self.path.len());
        self.path.push(node);
    }

    fn leave(&mut self, node: NodeIndex) {
        self.path.pop();
        self.on_path[node.index()] = None;
    }
}
