//! Eulerian augmentation of the street graph.
//!
//! The augmented graph is a view, not a copy: each undirected edge copy is
//! a pair of directed adjacency entries referencing the original edge
//! index. Duplicating a matched shortest path appends one more entry pair
//! per edge along it, so downstream traversal counting stays per-edge-id.

use fixedbitset::FixedBitSet;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::StreetGraph;
use crate::routing::dijkstra::ShortestPath;

/// One directed adjacency entry of the augmented multigraph.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AdjacencyEntry {
    pub(crate) target: NodeIndex,
    pub(crate) edge: EdgeIndex,
    /// Id of the undirected edge copy; shared with the twin entry on the
    /// other endpoint so marking a copy used consumes both directions.
    pub(crate) copy: usize,
}

/// Adjacency view of the original graph plus duplicated matching paths.
///
/// Entries are sorted by edge index (then copy id) per node, which fixes
/// the circuit extraction order across runs.
pub(crate) struct AugmentedGraph {
    pub(crate) adjacency: Vec<Vec<AdjacencyEntry>>,
    /// Number of undirected edge copies.
    pub(crate) copies: usize,
}

impl AugmentedGraph {
    /// Build the augmented adjacency over one connected component.
    ///
    /// Every original edge inside `component` contributes one copy; every
    /// edge of every duplicated path contributes one more.
    pub(crate) fn build(
        graph: &StreetGraph,
        component: &FixedBitSet,
        duplicated: &[&ShortestPath],
    ) -> Self {
        let mut adjacency: Vec<Vec<AdjacencyEntry>> = vec![Vec::new(); graph.node_count()];
        let mut copies = 0;

        let push_copy = |adjacency: &mut Vec<Vec<AdjacencyEntry>>,
                             copies: &mut usize,
                             edge: EdgeIndex,
                             a: NodeIndex,
                             b: NodeIndex| {
            let copy = *copies;
            *copies += 1;
            adjacency[a.index()].push(AdjacencyEntry {
                target: b,
                edge,
                copy,
            });
            adjacency[b.index()].push(AdjacencyEntry {
                target: a,
                edge,
                copy,
            });
        };

        for edge in graph.graph.edge_references() {
            if !component.contains(edge.source().index()) {
                continue;
            }
            push_copy(
                &mut adjacency,
                &mut copies,
                edge.id(),
                edge.source(),
                edge.target(),
            );
        }

        for path in duplicated {
            for (&edge, pair) in path.edges.iter().zip(path.nodes.windows(2)) {
                push_copy(&mut adjacency, &mut copies, edge, pair[0], pair[1]);
            }
        }

        for entries in &mut adjacency {
            entries.sort_by_key(|e| (e.edge.index(), e.copy));
        }

        Self { adjacency, copies }
    }

    pub(crate) fn degree(&self, node: NodeIndex) -> usize {
        self.adjacency[node.index()].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StreetGraphBuilder;
    use crate::routing::dijkstra::shortest_path_tree;
    use geo::{line_string, Point};

    fn path_graph() -> StreetGraph {
        let mut b = StreetGraphBuilder::new();
        b.add_node(1, Point::new(0.0, 0.0)).unwrap();
        b.add_node(2, Point::new(0.001, 0.0)).unwrap();
        b.add_node(3, Point::new(0.002, 0.0)).unwrap();
        b.add_edge(
            1,
            2,
            line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)],
            None,
        )
        .unwrap();
        b.add_edge(
            2,
            3,
            line_string![(x: 0.001, y: 0.0), (x: 0.002, y: 0.0)],
            None,
        )
        .unwrap();
        b.build()
    }

    #[test]
    fn plain_graph_mirrors_adjacency() {
        let g = path_graph();
        let component = g.component_of(g.node(1).unwrap());
        let aug = AugmentedGraph::build(&g, &component, &[]);
        assert_eq!(aug.copies, 2);
        assert_eq!(aug.degree(g.node(1).unwrap()), 1);
        assert_eq!(aug.degree(g.node(2).unwrap()), 2);
    }

    #[test]
    fn duplicated_path_evens_out_degrees() {
        let g = path_graph();
        let n1 = g.node(1).unwrap();
        let n3 = g.node(3).unwrap();
        let component = g.component_of(n1);
        let tree = shortest_path_tree(&g, n1);
        let path = tree.path_to(&g, n3).unwrap();
        let aug = AugmentedGraph::build(&g, &component, &[&path]);

        assert_eq!(aug.copies, 4);
        for node in [n1, g.node(2).unwrap(), n3] {
            assert_eq!(aug.degree(node) % 2, 0, "odd degree at {node:?}");
        }
    }

    #[test]
    fn twin_entries_share_copy_id() {
        let g = path_graph();
        let component = g.component_of(g.node(1).unwrap());
        let aug = AugmentedGraph::build(&g, &component, &[]);
        let n1 = g.node(1).unwrap();
        let n2 = g.node(2).unwrap();
        let from_1 = &aug.adjacency[n1.index()][0];
        let twin = aug.adjacency[n2.index()]
            .iter()
            .find(|e| e.copy == from_1.copy)
            .unwrap();
        assert_eq!(twin.target, n1);
        assert_eq!(twin.edge, from_1.edge);
    }
}
