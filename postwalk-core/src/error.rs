use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("street graph has no edges")]
    EmptyGraph,
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),
    #[error("node id {0} added twice")]
    DuplicateNode(NodeId),
    #[error("invalid edge {from} -> {to}: {reason}")]
    InvalidEdge {
        from: NodeId,
        to: NodeId,
        reason: String,
    },
    #[error("start node {0} has no incident edges")]
    IsolatedStart(NodeId),
    #[error("no path between odd-degree nodes {from} and {to}")]
    UnreachableOdd { from: NodeId, to: NodeId },
    #[error("odd-degree node set has odd size {0}")]
    OddCardinality(usize),
    #[error("empty traversal sequence")]
    EmptyCircuit,
    #[error("route computation cancelled")]
    Cancelled,
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
