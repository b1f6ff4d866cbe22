use std::{cmp::Ordering, collections::BinaryHeap};

use hashbrown::HashMap;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::StreetGraph;
use crate::Error;

#[derive(Copy, Clone)]
struct State {
    cost: f64,
    node: NodeIndex,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for State {}

// Min-heap by cost (reversed from standard Rust BinaryHeap); ties broken by
// node index so the pop order is stable across runs.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.index().cmp(&self.node.index()))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path between two nodes of the street graph.
#[derive(Debug, Clone)]
pub struct ShortestPath {
    pub source: NodeIndex,
    pub target: NodeIndex,
    /// Node sequence from `source` to `target` inclusive.
    pub nodes: Vec<NodeIndex>,
    /// Edge sequence; one entry per consecutive node pair.
    pub edges: Vec<EdgeIndex>,
    /// Sum of edge lengths in meters.
    pub distance: f64,
}

/// Single-source shortest-path tree with predecessor edges.
///
/// Recording the predecessor edge alongside the predecessor node keeps path
/// reconstruction unambiguous when parallel edges connect the same node
/// pair. Unreachable nodes are absent from all three maps.
pub(crate) struct ShortestPathTree {
    source: NodeIndex,
    distances: HashMap<NodeIndex, f64>,
    pred_node: HashMap<NodeIndex, NodeIndex>,
    pred_edge: HashMap<NodeIndex, EdgeIndex>,
}

impl ShortestPathTree {
    pub(crate) fn distance_to(&self, node: NodeIndex) -> Option<f64> {
        self.distances.get(&node).copied()
    }

    /// Reconstruct the path from the tree source to `target` by walking the
    /// predecessor maps backwards.
    ///
    /// # Errors
    ///
    /// `UnreachableOdd` when `target` was never reached.
    pub(crate) fn path_to(
        &self,
        graph: &StreetGraph,
        target: NodeIndex,
    ) -> Result<ShortestPath, Error> {
        let distance = self
            .distances
            .get(&target)
            .copied()
            .ok_or_else(|| Error::UnreachableOdd {
                from: graph.node_id(self.source),
                to: graph.node_id(target),
            })?;

        let mut nodes = vec![target];
        let mut edges = Vec::new();
        let mut current = target;
        while current != self.source {
            let prev = self
                .pred_node
                .get(&current)
                .copied()
                .ok_or_else(|| Error::UnreachableOdd {
                    from: graph.node_id(self.source),
                    to: graph.node_id(target),
                })?;
            let via = self.pred_edge[&current];
            nodes.push(prev);
            edges.push(via);
            current = prev;
        }
        nodes.reverse();
        edges.reverse();

        Ok(ShortestPath {
            source: self.source,
            target,
            nodes,
            edges,
            distance,
        })
    }
}

/// Dijkstra's algorithm over the street graph with edge lengths as weights.
///
/// Lazy deletion: a popped entry whose cost exceeds the recorded best is
/// skipped. Relaxation is strict, so on equal tentative distance the first
/// encountered predecessor wins.
pub(crate) fn shortest_path_tree(graph: &StreetGraph, source: NodeIndex) -> ShortestPathTree {
    let estimated = graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated);
    let mut pred_node: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(estimated);
    let mut pred_edge: HashMap<NodeIndex, EdgeIndex> = HashMap::with_capacity(estimated);
    let mut heap = BinaryHeap::with_capacity(estimated / 4);

    heap.push(State {
        cost: 0.0,
        node: source,
    });
    distances.insert(source, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        for edge in graph.graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + edge.weight().length;

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    pred_node.insert(next, node);
                    pred_edge.insert(next, edge.id());
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        pred_node.insert(next, node);
                        pred_edge.insert(next, edge.id());
                    }
                }
            }
        }
    }

    ShortestPathTree {
        source,
        distances,
        pred_node,
        pred_edge,
    }
}
