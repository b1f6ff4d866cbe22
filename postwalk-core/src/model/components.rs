//! Street network components - nodes, edges, and traversals

use geo::{LineString, Point};
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::NodeId;

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// OSM ID of the node
    pub id: NodeId,
    /// Node coordinates
    pub location: Point<f64>,
}

/// Street graph edge (street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Segment length in meters
    pub length: f64,
    /// Segment polyline, oriented from the edge's source node to its target
    pub geometry: LineString<f64>,
    /// Street name, when the source way carried one
    pub name: Option<String>,
}

/// One directed walk over an undirected edge.
///
/// The edge itself is undirected; `from`/`to` record the direction this
/// particular traversal walks it in. Geometry is reversed at traversal time
/// when `from` is the edge's target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeTraversal {
    pub edge: EdgeIndex,
    pub from: NodeIndex,
    pub to: NodeIndex,
}
