//! Street network graph and spatial index.

use fixedbitset::FixedBitSet;
use geo::{Coord, LineString, Point};
use hashbrown::HashMap;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rstar::{primitives::GeomWithData, RTree};

use crate::geodesy;
use crate::model::{EdgeTraversal, StreetEdge, StreetNode};
use crate::NodeId;

/// A node position tagged with its graph index, for R-tree lookup.
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Immutable undirected street multigraph.
///
/// Nodes carry their OSM id and location, edges carry length, polyline
/// geometry and an optional street name. Parallel edges between the same
/// node pair are allowed and keep independent identity. The graph is built
/// once by [`StreetGraphBuilder`](crate::model::StreetGraphBuilder) and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    pub graph: UnGraph<StreetNode, StreetEdge>,
    node_index: HashMap<NodeId, NodeIndex>,
    rtree: RTree<IndexedPoint>,
}

impl StreetGraph {
    pub(crate) fn new(
        graph: UnGraph<StreetNode, StreetEdge>,
        node_index: HashMap<NodeId, NodeIndex>,
    ) -> Self {
        let points: Vec<IndexedPoint> = graph
            .node_indices()
            .map(|idx| {
                let loc = graph[idx].location;
                GeomWithData::new([loc.x(), loc.y()], idx)
            })
            .collect();
        Self {
            graph,
            node_index,
            rtree: RTree::bulk_load(points),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Resolve an external node id to its graph index.
    pub fn node(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_index.get(&id).copied()
    }

    /// External id of a node.
    pub fn node_id(&self, node: NodeIndex) -> NodeId {
        self.graph[node].id
    }

    /// Location of a node.
    pub fn location(&self, node: NodeIndex) -> Point<f64> {
        self.graph[node].location
    }

    pub fn edge(&self, edge: EdgeIndex) -> &StreetEdge {
        &self.graph[edge]
    }

    /// Endpoints of an edge in geometry order (source, target).
    pub fn edge_endpoints(&self, edge: EdgeIndex) -> (NodeIndex, NodeIndex) {
        self.graph
            .edge_endpoints(edge)
            .expect("edge index out of bounds")
    }

    /// Whether a traversal walks the edge in geometry order.
    pub fn is_forward(&self, traversal: &EdgeTraversal) -> bool {
        self.edge_endpoints(traversal.edge).0 == traversal.from
    }

    /// Edge geometry in the walk direction of the given traversal.
    pub fn traversal_geometry(&self, traversal: &EdgeTraversal) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = self.edge(traversal.edge).geometry.0.clone();
        if !self.is_forward(traversal) {
            coords.reverse();
        }
        LineString::from(coords)
    }

    /// Number of incident edges, counting each parallel edge separately.
    pub fn degree(&self, node: NodeIndex) -> usize {
        self.graph.edges(node).count()
    }

    /// Nodes with odd degree, in ascending index order.
    pub fn odd_degree_nodes(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&n| self.degree(n) % 2 == 1)
            .collect()
    }

    /// Odd-degree nodes restricted to a connected component.
    pub(crate) fn odd_degree_in(&self, component: &FixedBitSet) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&n| component.contains(n.index()) && self.degree(n) % 2 == 1)
            .collect()
    }

    /// Sum of all edge lengths in meters.
    pub fn total_length(&self) -> f64 {
        self.graph.edge_weights().map(|e| e.length).sum()
    }

    /// Node set of the connected component containing `start`.
    pub(crate) fn component_of(&self, start: NodeIndex) -> FixedBitSet {
        let mut visited = FixedBitSet::with_capacity(self.graph.node_count());
        visited.insert(start.index());
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for edge in self.graph.edges(node) {
                let next = edge.target();
                if !visited.contains(next.index()) {
                    visited.insert(next.index());
                    stack.push(next);
                }
            }
        }
        visited
    }

    /// Edges with at least one endpoint outside the component, ascending.
    pub(crate) fn edges_outside(&self, component: &FixedBitSet) -> Vec<EdgeIndex> {
        self.graph
            .edge_references()
            .filter(|e| !component.contains(e.source().index()))
            .map(|e| e.id())
            .collect()
    }

    /// Graph node closest to an arbitrary location, with the haversine
    /// distance to it in meters. `None` on an empty graph.
    pub fn nearest_node(&self, location: &Point<f64>) -> Option<(NodeIndex, f64)> {
        self.rtree
            .nearest_neighbor(&[location.x(), location.y()])
            .map(|entry| {
                let node = entry.data;
                let dist = geodesy::haversine_distance(*location, self.location(node));
                (node, dist)
            })
    }
}
