// Re-export key components
pub use crate::error::Error;
pub use crate::geodesy::{haversine_distance, initial_bearing, normalize_angle};
pub use crate::instructions::{instructions_for, Instruction, InstructionKind};
pub use crate::model::{
    EdgeTraversal, StreetEdge, StreetGraph, StreetGraphBuilder, StreetNode,
};
pub use crate::routing::{solve, solve_with, CancelToken, RouteResult, ShortestPath};

// Core identifiers and tuning constants
pub use crate::NodeId;
pub use crate::{DEFAULT_AVERAGE_SPEED_KMH, MAX_EXACT_MATCHING, MIN_TURN_DISTANCE};
