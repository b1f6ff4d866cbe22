//! Turn-by-turn instruction generation from a traversal sequence.
//!
//! Each junction between consecutive traversals is classified by the angle
//! between the bearing leaving the incoming segment and the bearing entering
//! the outgoing one, both measured on the geometry actually walked. A
//! street-name change forces an emission even when the geometry continues
//! straight, because gradual bends defeat the angle classifier.

use geo::Point;
use serde::Serialize;

use crate::geodesy::{initial_bearing, normalize_angle};
use crate::model::{EdgeTraversal, StreetGraph};
use crate::{Error, MIN_TURN_DISTANCE};

/// Kind of manoeuvre a directive announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    Start,
    Continue,
    SlightLeft,
    SlightRight,
    TurnLeft,
    TurnRight,
    SharpLeft,
    SharpRight,
    UTurn,
    Arrived,
}

impl InstructionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Continue => "continue",
            Self::SlightLeft => "slight_left",
            Self::SlightRight => "slight_right",
            Self::TurnLeft => "turn_left",
            Self::TurnRight => "turn_right",
            Self::SharpLeft => "sharp_left",
            Self::SharpRight => "sharp_right",
            Self::UTurn => "u_turn",
            Self::Arrived => "arrived",
        }
    }
}

/// A single navigation directive.
#[derive(Debug, Clone, Serialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    /// Street walked after the directive, when known.
    pub street_name: Option<String>,
    /// Meters accumulated since the previous directive (first edge length
    /// for `Start`, residual tail for `Arrived`).
    pub distance: f64,
    /// Where the directive takes effect.
    pub location: Point<f64>,
    /// Heading after the directive, degrees clockwise from north (0 for
    /// `Arrived`).
    pub bearing: f64,
}

/// Classify a junction by its normalised bearing change.
fn classify(delta: f64) -> InstructionKind {
    let magnitude = delta.abs();
    if magnitude < 15.0 {
        InstructionKind::Continue
    } else if magnitude < 45.0 {
        side(delta, InstructionKind::SlightLeft, InstructionKind::SlightRight)
    } else if magnitude < 120.0 {
        side(delta, InstructionKind::TurnLeft, InstructionKind::TurnRight)
    } else if magnitude < 160.0 {
        side(delta, InstructionKind::SharpLeft, InstructionKind::SharpRight)
    } else {
        InstructionKind::UTurn
    }
}

fn side(delta: f64, left: InstructionKind, right: InstructionKind) -> InstructionKind {
    if delta < 0.0 {
        left
    } else {
        right
    }
}

/// Bearing of the first geometry segment of a traversal, in walk direction.
fn entry_bearing(graph: &StreetGraph, traversal: &EdgeTraversal) -> f64 {
    let coords = &graph.edge(traversal.edge).geometry.0;
    let (a, b) = if graph.is_forward(traversal) {
        (coords[0], coords[1])
    } else {
        (coords[coords.len() - 1], coords[coords.len() - 2])
    };
    initial_bearing(Point::from(a), Point::from(b))
}

/// Bearing of the last geometry segment of a traversal, in walk direction.
fn exit_bearing(graph: &StreetGraph, traversal: &EdgeTraversal) -> f64 {
    let coords = &graph.edge(traversal.edge).geometry.0;
    let (a, b) = if graph.is_forward(traversal) {
        (coords[coords.len() - 2], coords[coords.len() - 1])
    } else {
        (coords[1], coords[0])
    };
    initial_bearing(Point::from(a), Point::from(b))
}

/// Convert an Eulerian traversal sequence into navigation directives.
///
/// A `Start` directive opens the list and an `Arrived` directive closes it.
/// Junction directives are only emitted once at least
/// [`MIN_TURN_DISTANCE`] meters accumulated since the previous emission,
/// which keeps densely subdivided OSM ways from spamming instructions.
///
/// # Errors
///
/// `EmptyCircuit` when the traversal sequence is empty.
pub fn instructions_for(
    circuit: &[EdgeTraversal],
    graph: &StreetGraph,
) -> Result<Vec<Instruction>, Error> {
    let first = circuit.first().ok_or(Error::EmptyCircuit)?;
    let last = circuit.last().expect("non-empty circuit");

    let mut instructions = Vec::new();
    instructions.push(Instruction {
        kind: InstructionKind::Start,
        street_name: graph.edge(first.edge).name.clone(),
        distance: graph.edge(first.edge).length,
        location: graph.location(first.from),
        bearing: entry_bearing(graph, first),
    });

    let mut accumulated = 0.0;
    for pair in circuit.windows(2) {
        let (cur, nxt) = (&pair[0], &pair[1]);
        accumulated += graph.edge(cur.edge).length;

        let bearing_in = entry_bearing(graph, nxt);
        let delta = normalize_angle(bearing_in - exit_bearing(graph, cur));
        let kind = classify(delta);

        let cur_name = &graph.edge(cur.edge).name;
        let nxt_name = &graph.edge(nxt.edge).name;
        let street_changed = nxt_name.is_some() && nxt_name != cur_name;

        if (kind != InstructionKind::Continue || street_changed)
            && accumulated >= MIN_TURN_DISTANCE
        {
            instructions.push(Instruction {
                kind,
                street_name: nxt_name.clone(),
                distance: accumulated,
                location: graph.location(cur.to),
                bearing: bearing_in,
            });
            accumulated = 0.0;
        }
    }

    accumulated += graph.edge(last.edge).length;
    instructions.push(Instruction {
        kind: InstructionKind::Arrived,
        street_name: None,
        distance: accumulated,
        location: graph.location(last.to),
        bearing: 0.0,
    });

    Ok(instructions)
}
