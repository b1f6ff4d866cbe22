//! Route inspection solver.
//!
//! Orchestrates the full pipeline: odd-degree vertex detection, all-pairs
//! shortest paths among the odd vertices, minimum-weight perfect matching,
//! augmentation, Eulerian circuit extraction and instruction generation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use geo::{Coord, LineString};
use hashbrown::HashMap;
use log::{debug, warn};
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::instructions::{instructions_for, Instruction};
use crate::model::{EdgeTraversal, StreetGraph};
use crate::routing::augment::AugmentedGraph;
use crate::routing::circuit::hierholzer;
use crate::routing::dijkstra::{shortest_path_tree, ShortestPath};
use crate::routing::matching::min_weight_matching;
use crate::{Error, NodeId};

/// Cooperative cancellation flag shared between the solver and its caller.
///
/// The solver checks the flag between major phases and before each
/// per-source shortest-path run; on observed cancellation it returns
/// [`Error::Cancelled`] without partial output.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A complete coverage walk over a street graph.
#[derive(Debug, Clone)]
pub struct RouteResult {
    /// Eulerian circuit as directed edge traversals.
    pub circuit: Vec<EdgeTraversal>,
    /// Edge index per traversal, in walk order.
    pub edge_order: Vec<EdgeIndex>,
    /// Concatenated walk geometry.
    pub path: LineString<f64>,
    /// Total walk length in meters.
    pub total_distance: f64,
    /// Summed length of the covered street segments, each counted once.
    pub original_distance: f64,
    /// Edges walked more than once, ascending.
    pub duplicate_edges: Vec<EdgeIndex>,
    /// Edges outside the start node's component, ascending. Empty on a
    /// connected graph.
    pub unreached_edges: Vec<EdgeIndex>,
    /// Turn-by-turn directives for the walk.
    pub instructions: Vec<Instruction>,
}

impl RouteResult {
    /// Estimated walk duration in milliseconds at the given average speed.
    pub fn estimated_time_ms(&self, average_speed_kmh: f64) -> u64 {
        (self.total_distance / 1000.0 / average_speed_kmh * 3_600_000.0).round() as u64
    }
}

/// Compute a minimum-distance closed walk covering every street segment.
///
/// `start` selects the walk's start/end node by external id; without it the
/// solver starts at the odd-degree node with the lowest external id,
/// falling back to the lowest-id node with positive degree.
///
/// On a disconnected graph the walk covers the start node's component and
/// the remaining edges are reported in
/// [`RouteResult::unreached_edges`].
///
/// # Errors
///
/// `EmptyGraph` when the graph has no edges, `UnknownNode` for an unknown
/// start id, `IsolatedStart` for a start node without incident edges, and
/// the defensive solver kinds (`UnreachableOdd`, `OddCardinality`) on
/// graphs violating the model invariants.
pub fn solve(graph: &StreetGraph, start: Option<NodeId>) -> Result<RouteResult, Error> {
    solve_with(graph, start, None)
}

/// [`solve`] with cooperative cancellation.
pub fn solve_with(
    graph: &StreetGraph,
    start: Option<NodeId>,
    cancel: Option<&CancelToken>,
) -> Result<RouteResult, Error> {
    if graph.edge_count() == 0 {
        return Err(Error::EmptyGraph);
    }

    let start_node = resolve_start(graph, start)?;
    check_cancelled(cancel)?;

    let component = graph.component_of(start_node);
    let unreached_edges = graph.edges_outside(&component);
    if !unreached_edges.is_empty() {
        warn!(
            "{} of {} street segments are outside the start node's component and will not be covered",
            unreached_edges.len(),
            graph.edge_count()
        );
    }

    let odd = graph.odd_degree_in(&component);
    debug!(
        "solving coverage walk over {} nodes, {} edges, {} odd-degree nodes",
        component.count_ones(..),
        graph.edge_count() - unreached_edges.len(),
        odd.len()
    );
    check_cancelled(cancel)?;

    let duplicated = if odd.is_empty() {
        Vec::new()
    } else {
        matched_paths(graph, &odd, cancel)?
    };
    check_cancelled(cancel)?;

    let augmented = AugmentedGraph::build(
        graph,
        &component,
        &duplicated.iter().collect::<Vec<_>>(),
    );
    check_cancelled(cancel)?;

    let circuit = hierholzer(&augmented, start_node);
    check_cancelled(cancel)?;

    build_result(graph, circuit, unreached_edges)
}

fn check_cancelled(cancel: Option<&CancelToken>) -> Result<(), Error> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(Error::Cancelled),
        _ => Ok(()),
    }
}

fn resolve_start(graph: &StreetGraph, start: Option<NodeId>) -> Result<NodeIndex, Error> {
    if let Some(id) = start {
        let node = graph.node(id).ok_or(Error::UnknownNode(id))?;
        if graph.degree(node) == 0 {
            return Err(Error::IsolatedStart(id));
        }
        return Ok(node);
    }
    // Starting at an odd-degree node tends to produce a more natural
    // route even though its augmented degree is even. Candidates are
    // ranked by external id, not insertion order.
    graph
        .odd_degree_nodes()
        .into_iter()
        .min_by_key(|&n| graph.node_id(n))
        .or_else(|| {
            graph
                .graph
                .node_indices()
                .filter(|&n| graph.degree(n) > 0)
                .min_by_key(|&n| graph.node_id(n))
        })
        .ok_or(Error::EmptyGraph)
}

/// All-pairs shortest paths among the odd vertices, minimum-weight
/// matching, and the shortest paths selected for duplication.
fn matched_paths(
    graph: &StreetGraph,
    odd: &[NodeIndex],
    cancel: Option<&CancelToken>,
) -> Result<Vec<ShortestPath>, Error> {
    let k = odd.len();
    let mut weights = vec![vec![0.0; k]; k];
    let mut paths: HashMap<(usize, usize), ShortestPath> = HashMap::with_capacity(k * (k - 1) / 2);

    for (i, &source) in odd.iter().enumerate() {
        check_cancelled(cancel)?;
        // Per-source scratch is dropped after the paths to the remaining
        // odd targets are extracted.
        let tree = shortest_path_tree(graph, source);
        for (j, &target) in odd.iter().enumerate().skip(i + 1) {
            let path = tree.path_to(graph, target)?;
            weights[i][j] = path.distance;
            weights[j][i] = path.distance;
            paths.insert((i, j), path);
        }
    }

    check_cancelled(cancel)?;
    let matching = min_weight_matching(&weights)?;
    debug!("matched {} odd-degree node pairs", matching.len());

    Ok(matching
        .into_iter()
        .map(|pair| paths.remove(&pair).expect("matching pair has a path"))
        .collect())
}

/// Assemble the result: edge order, distances, duplicate diagnostics,
/// concatenated geometry and instructions.
fn build_result(
    graph: &StreetGraph,
    circuit: Vec<EdgeTraversal>,
    unreached_edges: Vec<EdgeIndex>,
) -> Result<RouteResult, Error> {
    let edge_order: Vec<EdgeIndex> = circuit.iter().map(|t| t.edge).collect();
    let total_distance: f64 = edge_order.iter().map(|&e| graph.edge(e).length).sum();

    let mut traversal_counts: HashMap<EdgeIndex, usize> = HashMap::new();
    for &edge in &edge_order {
        *traversal_counts.entry(edge).or_insert(0) += 1;
    }
    // Summed in ascending edge order so the float total is reproducible.
    let original_distance: f64 = graph
        .graph
        .edge_indices()
        .filter(|e| traversal_counts.contains_key(e))
        .map(|e| graph.edge(e).length)
        .sum();
    let mut duplicate_edges: Vec<EdgeIndex> = traversal_counts
        .iter()
        .filter(|&(_, &count)| count > 1)
        .map(|(&edge, _)| edge)
        .collect();
    duplicate_edges.sort_unstable();

    let path = concatenate_geometry(graph, &circuit);
    let instructions = instructions_for(&circuit, graph)?;

    Ok(RouteResult {
        circuit,
        edge_order,
        path,
        total_distance,
        original_distance,
        duplicate_edges,
        unreached_edges,
        instructions,
    })
}

/// Concatenate per-traversal geometries in walk direction, dropping the
/// shared junction point on every append after the first.
fn concatenate_geometry(graph: &StreetGraph, circuit: &[EdgeTraversal]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for traversal in circuit {
        let mut segment = graph.edge(traversal.edge).geometry.0.clone();
        if !graph.is_forward(traversal) {
            segment.reverse();
        }
        let skip = usize::from(!coords.is_empty());
        coords.extend(segment.into_iter().skip(skip));
    }
    LineString::from(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy;
    use crate::instructions::InstructionKind;
    use crate::model::StreetGraphBuilder;
    use geo::{line_string, Point};

    fn single_edge() -> StreetGraph {
        let mut b = StreetGraphBuilder::new();
        b.add_node(1, Point::new(0.0, 0.0)).unwrap();
        b.add_node(2, Point::new(0.0, 0.001)).unwrap();
        b.add_edge(
            1,
            2,
            line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.001)],
            None,
        )
        .unwrap();
        b.build()
    }

    fn triangle() -> StreetGraph {
        let mut b = StreetGraphBuilder::new();
        b.add_node(1, Point::new(0.0, 0.0)).unwrap();
        b.add_node(2, Point::new(0.001, 0.0)).unwrap();
        b.add_node(3, Point::new(0.0005, 0.001)).unwrap();
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
            line_string![(x: 0.001, y: 0.0), (x: 0.0005, y: 0.001)],
            None,
        )
        .unwrap();
        b.add_edge(
            3,
            1,
            line_string![(x: 0.0005, y: 0.001), (x: 0.0, y: 0.0)],
            None,
        )
        .unwrap();
        b.build()
    }

    fn square_with_diagonal() -> StreetGraph {
        let coords = [
            (1, 0.0, 0.0),
            (2, 0.001, 0.0),
            (3, 0.001, 0.001),
            (4, 0.0, 0.001),
        ];
        let mut b = StreetGraphBuilder::new();
        for (id, x, y) in coords {
            b.add_node(id, Point::new(x, y)).unwrap();
        }
        for (from, to) in [(1, 2), (2, 3), (3, 4), (4, 1), (1, 3)] {
            let a = coords.iter().find(|c| c.0 == from).unwrap();
            let z = coords.iter().find(|c| c.0 == to).unwrap();
            b.add_edge(
                from,
                to,
                line_string![(x: a.1, y: a.2), (x: z.1, y: z.2)],
                None,
            )
            .unwrap();
        }
        b.build()
    }

    fn two_triangles() -> StreetGraph {
        let mut b = StreetGraphBuilder::new();
        let coords = [
            (1, 0.0, 0.0),
            (2, 0.001, 0.0),
            (3, 0.0005, 0.001),
            (11, 0.1, 0.1),
            (12, 0.101, 0.1),
            (13, 0.1005, 0.101),
        ];
        for (id, x, y) in coords {
            b.add_node(id, Point::new(x, y)).unwrap();
        }
        for (from, to) in [(1, 2), (2, 3), (3, 1), (11, 12), (12, 13), (13, 11)] {
            let a = coords.iter().find(|c| c.0 == from).unwrap();
            let z = coords.iter().find(|c| c.0 == to).unwrap();
            b.add_edge(
                from,
                to,
                line_string![(x: a.1, y: a.2), (x: z.1, y: z.2)],
                None,
            )
            .unwrap();
        }
        b.build()
    }

    fn assert_route_invariants(g: &StreetGraph, result: &RouteResult) {
        assert!(result.total_distance >= result.original_distance - 1e-9);
        // Closed walk with chained traversals.
        assert_eq!(
            result.circuit.first().unwrap().from,
            result.circuit.last().unwrap().to
        );
        for pair in result.circuit.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        // Concatenated geometry length agrees with the reported total.
        let geometric = geodesy::polyline_length(&result.path);
        assert!(
            (geometric - result.total_distance).abs() <= 1e-6 * result.total_distance,
            "geometry {geometric} vs total {}",
            result.total_distance
        );
        // Instruction envelope.
        assert!(result.instructions.len() >= 2);
        assert_eq!(result.instructions.first().unwrap().kind, InstructionKind::Start);
        assert_eq!(result.instructions.last().unwrap().kind, InstructionKind::Arrived);
        for ins in &result.instructions {
            assert!((0.0..360.0).contains(&ins.bearing), "bearing {}", ins.bearing);
            assert!(ins.distance >= 0.0);
            if let Some(name) = &ins.street_name {
                assert!(!name.is_empty());
            }
        }
        // Every covered edge appears at least once.
        let covered: hashbrown::HashSet<EdgeIndex> = result.edge_order.iter().copied().collect();
        for e in g.graph.edge_indices() {
            if result.unreached_edges.contains(&e) {
                assert!(!covered.contains(&e));
            } else {
                assert!(covered.contains(&e), "edge {e:?} never walked");
            }
        }
    }

    #[test]
    fn empty_graph_is_rejected() {
        let mut b = StreetGraphBuilder::new();
        b.add_node(1, Point::new(0.0, 0.0)).unwrap();
        let g = b.build();
        assert_eq!(solve(&g, None).err(), Some(Error::EmptyGraph));
    }

    #[test]
    fn single_edge_is_walked_out_and_back() {
        let g = single_edge();
        let result = solve(&g, Some(1)).unwrap();
        assert_eq!(result.edge_order.len(), 2);
        assert_eq!(result.edge_order[0], result.edge_order[1]);
        assert!((result.total_distance - 222.38).abs() < 0.05);
        assert!((result.original_distance - 111.19).abs() < 0.05);
        assert_eq!(result.duplicate_edges.len(), 1);
        assert_eq!(
            result.instructions[1].kind,
            InstructionKind::UTurn
        );
        assert_route_invariants(&g, &result);
    }

    #[test]
    fn eulerian_triangle_needs_no_duplication() {
        let g = triangle();
        let result = solve(&g, Some(1)).unwrap();
        assert_eq!(result.edge_order.len(), 3);
        assert!(result.duplicate_edges.is_empty());
        assert!((result.total_distance - result.original_distance).abs() < 1e-9);
        assert!((result.total_distance - g.total_length()).abs() < 1e-9);
        assert_route_invariants(&g, &result);
    }

    #[test]
    fn square_with_diagonal_duplicates_the_diagonal() {
        let g = square_with_diagonal();
        let result = solve(&g, Some(1)).unwrap();
        assert_eq!(result.edge_order.len(), 6);
        // Odd nodes are 1 and 3; the diagonal (edge 4) is their shortest
        // connection and gets walked twice.
        let diagonal = EdgeIndex::new(4);
        assert_eq!(result.duplicate_edges, vec![diagonal]);
        assert_eq!(
            result.edge_order.iter().filter(|&&e| e == diagonal).count(),
            2
        );
        let diagonal_len = g.edge(diagonal).length;
        assert!(
            (result.total_distance - result.original_distance - diagonal_len).abs() < 1e-9
        );
        assert_route_invariants(&g, &result);
    }

    #[test]
    fn disconnected_graph_covers_start_component() {
        let g = two_triangles();
        let result = solve(&g, Some(1)).unwrap();
        assert_eq!(result.edge_order.len(), 3);
        assert_eq!(result.unreached_edges.len(), 3);
        assert_route_invariants(&g, &result);

        // Starting in the other component flips coverage.
        let result = solve(&g, Some(11)).unwrap();
        assert_eq!(result.edge_order.len(), 3);
        assert_eq!(result.unreached_edges.len(), 3);
    }

    #[test]
    fn default_start_prefers_odd_node() {
        let g = single_edge();
        let result = solve(&g, None).unwrap();
        assert_eq!(result.circuit.first().unwrap().from, g.node(1).unwrap());
    }

    #[test]
    fn default_start_uses_lowest_external_id() {
        // Node 7 is inserted first; the lowest external id still wins.
        let mut b = StreetGraphBuilder::new();
        b.add_node(7, Point::new(0.0, 0.0)).unwrap();
        b.add_node(2, Point::new(0.001, 0.0)).unwrap();
        b.add_edge(
            7,
            2,
            line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)],
            None,
        )
        .unwrap();
        let g = b.build();
        let result = solve(&g, None).unwrap();
        assert_eq!(
            g.node_id(result.circuit.first().unwrap().from),
            2
        );
    }

    #[test]
    fn unknown_start_is_rejected() {
        let g = triangle();
        assert_eq!(solve(&g, Some(99)).err(), Some(Error::UnknownNode(99)));
    }

    #[test]
    fn isolated_start_is_rejected() {
        let mut b = StreetGraphBuilder::new();
        b.add_node(1, Point::new(0.0, 0.0)).unwrap();
        b.add_node(2, Point::new(0.001, 0.0)).unwrap();
        b.add_node(3, Point::new(0.01, 0.01)).unwrap();
        b.add_edge(
            1,
            2,
            line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)],
            None,
        )
        .unwrap();
        let g = b.build();
        assert_eq!(solve(&g, Some(3)).err(), Some(Error::IsolatedStart(3)));
    }

    #[test]
    fn cancellation_short_circuits() {
        let g = triangle();
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(
            solve_with(&g, Some(1), Some(&token)).err(),
            Some(Error::Cancelled)
        );
    }

    #[test]
    fn result_is_deterministic() {
        let g = square_with_diagonal();
        let a = solve(&g, Some(1)).unwrap();
        let b = solve(&g, Some(1)).unwrap();
        assert_eq!(a.edge_order, b.edge_order);
        assert_eq!(a.circuit, b.circuit);
    }

    #[test]
    fn estimated_time_uses_average_speed() {
        let g = single_edge();
        let result = solve(&g, Some(1)).unwrap();
        // ~222.4 m at 30 km/h is ~26.7 s.
        let ms = result.estimated_time_ms(crate::DEFAULT_AVERAGE_SPEED_KMH);
        assert!((26_000..28_000).contains(&ms), "got {ms}");
    }
}
