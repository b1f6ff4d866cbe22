//! Core engine for computing street-coverage walks.
//!
//! Given an undirected street graph derived from OpenStreetMap data, the
//! engine computes a minimum-distance closed walk that traverses every
//! street segment at least once (the route inspection problem) and derives
//! turn-by-turn instructions from the resulting traversal sequence.
//!
//! The pipeline: odd-degree vertex detection, all-pairs shortest paths among
//! the odd vertices, minimum-weight perfect matching, duplication of the
//! matched shortest paths, and Eulerian circuit extraction via Hierholzer's
//! algorithm. See [`routing::solve`] for the entry point.

pub mod error;
pub mod geodesy;
pub mod instructions;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::Error;

/// Stable external identifier of a street-graph node (the OSM node id).
pub type NodeId = i64;

/// Largest odd-vertex set matched by exact branch-and-bound enumeration.
///
/// Exact matching is factorial in the set size; above this bound the solver
/// falls back to a greedy sorted-pairs approximation.
pub const MAX_EXACT_MATCHING: usize = 10;

/// Minimum accumulated distance in meters before a turn instruction is
/// emitted. Suppresses instruction spam on densely subdivided OSM ways.
pub const MIN_TURN_DISTANCE: f64 = 20.0;

/// Default average speed in km/h used for route duration estimates.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 30.0;
