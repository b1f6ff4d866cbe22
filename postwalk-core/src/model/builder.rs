//! Graph assembly from an external street source.
//!
//! OSM fetching and parsing live outside the core; whatever delivers the
//! street data feeds it through [`StreetGraphBuilder`], which validates the
//! graph invariants once at construction time so the solver can assume
//! well-formed input.

use geo::{LineString, Point};
use hashbrown::HashMap;
use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};

use crate::geodesy;
use crate::model::{StreetEdge, StreetGraph, StreetNode};
use crate::{Error, NodeId};

/// Coordinate agreement tolerance between an edge polyline endpoint and the
/// node it claims to attach to, in degrees.
const ENDPOINT_TOLERANCE: f64 = 1e-9;

/// Incremental [`StreetGraph`] constructor.
///
/// Edge lengths are derived from the polyline geometry rather than taken
/// from the caller, so the concatenated route geometry and the reported
/// distances always agree.
#[derive(Debug, Default)]
pub struct StreetGraphBuilder {
    graph: UnGraph<StreetNode, StreetEdge>,
    node_index: HashMap<NodeId, NodeIndex>,
}

impl StreetGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node.
    ///
    /// # Errors
    ///
    /// `DuplicateNode` if the id was already added, `InvalidEdge` for a
    /// non-finite location.
    pub fn add_node(&mut self, id: NodeId, location: Point<f64>) -> Result<NodeIndex, Error> {
        if !location.x().is_finite() || !location.y().is_finite() {
            return Err(Error::InvalidEdge {
                from: id,
                to: id,
                reason: "non-finite node location".to_string(),
            });
        }
        if self.node_index.contains_key(&id) {
            return Err(Error::DuplicateNode(id));
        }
        let idx = self.graph.add_node(StreetNode { id, location });
        self.node_index.insert(id, idx);
        Ok(idx)
    }

    /// Register an undirected street segment between two known nodes.
    ///
    /// The polyline must run from `from` to `to` and contain at least two
    /// points; its haversine length becomes the edge weight. Empty street
    /// names are normalised to `None`.
    ///
    /// # Errors
    ///
    /// `UnknownNode` for an unregistered endpoint, `InvalidEdge` for
    /// self-loops, too-short geometry, endpoint mismatch, non-finite
    /// coordinates or zero length.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        geometry: LineString<f64>,
        name: Option<String>,
    ) -> Result<EdgeIndex, Error> {
        if from == to {
            return Err(Error::InvalidEdge {
                from,
                to,
                reason: "self-loops are not allowed".to_string(),
            });
        }
        let from_idx = self.node_index.get(&from).copied().ok_or(Error::UnknownNode(from))?;
        let to_idx = self.node_index.get(&to).copied().ok_or(Error::UnknownNode(to))?;

        if geometry.0.len() < 2 {
            return Err(Error::InvalidEdge {
                from,
                to,
                reason: "geometry needs at least two points".to_string(),
            });
        }
        if geometry.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(Error::InvalidEdge {
                from,
                to,
                reason: "non-finite geometry coordinate".to_string(),
            });
        }

        let first = Point::from(geometry.0[0]);
        let last = Point::from(*geometry.0.last().expect("checked non-empty"));
        if !coords_agree(first, self.graph[from_idx].location)
            || !coords_agree(last, self.graph[to_idx].location)
        {
            return Err(Error::InvalidEdge {
                from,
                to,
                reason: "geometry endpoints do not match node locations".to_string(),
            });
        }

        let length = geodesy::polyline_length(&geometry);
        if length <= 0.0 {
            return Err(Error::InvalidEdge {
                from,
                to,
                reason: "zero-length geometry".to_string(),
            });
        }

        let edge = StreetEdge {
            length,
            geometry,
            name: name.filter(|n| !n.is_empty()),
        };
        Ok(self.graph.add_edge(from_idx, to_idx, edge))
    }

    /// Finalise the graph and build its spatial index.
    pub fn build(self) -> StreetGraph {
        debug!(
            "built street graph with {} nodes and {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        StreetGraph::new(self.graph, self.node_index)
    }
}

fn coords_agree(a: Point<f64>, b: Point<f64>) -> bool {
    (a.x() - b.x()).abs() <= ENDPOINT_TOLERANCE && (a.y() - b.y()).abs() <= ENDPOINT_TOLERANCE
}
