//! Street network model

pub mod builder;
pub mod components;
pub mod network;

pub use builder::StreetGraphBuilder;
pub use components::{EdgeTraversal, StreetEdge, StreetNode};
pub use network::{IndexedPoint, StreetGraph};
