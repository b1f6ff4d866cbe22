use geo::Point;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3_stub_gen::derive::gen_stub_pyfunction;

use postwalk_core::prelude::*;

use crate::model::PyStreetGraph;

/// Convert an Instruction to a Python dictionary
fn instruction_to_py(py: Python<'_>, instruction: &Instruction) -> PyObject {
    let dict = PyDict::new(py);

    dict.set_item("kind", instruction.kind.as_str()).unwrap();
    dict.set_item("street_name", instruction.street_name.clone())
        .unwrap();
    dict.set_item("distance_m", instruction.distance).unwrap();
    dict.set_item("lat", instruction.location.y()).unwrap();
    dict.set_item("lon", instruction.location.x()).unwrap();
    dict.set_item("bearing", instruction.bearing).unwrap();

    dict.into()
}

/// Convert a RouteResult to a Python dictionary
fn result_to_py(py: Python<'_>, result: &RouteResult, speed_kmh: f64) -> PyObject {
    let dict = PyDict::new(py);

    dict.set_item("total_distance_m", result.total_distance)
        .unwrap();
    dict.set_item("original_distance_m", result.original_distance)
        .unwrap();
    dict.set_item("estimated_time_ms", result.estimated_time_ms(speed_kmh))
        .unwrap();

    let edge_order: Vec<usize> = result.edge_order.iter().map(|e| e.index()).collect();
    dict.set_item("edge_order", edge_order).unwrap();
    let duplicates: Vec<usize> = result.duplicate_edges.iter().map(|e| e.index()).collect();
    dict.set_item("duplicate_edges", duplicates).unwrap();
    let unreached: Vec<usize> = result.unreached_edges.iter().map(|e| e.index()).collect();
    dict.set_item("unreached_edges", unreached).unwrap();

    let instructions: Vec<PyObject> = result
        .instructions
        .iter()
        .map(|ins| instruction_to_py(py, ins))
        .collect();
    dict.set_item("instructions", instructions).unwrap();

    dict.set_item("geojson", result.to_geojson_string()).unwrap();

    dict.into()
}

/// Compute a coverage walk over every street segment in the graph
///
/// Solves the route inspection problem: the returned walk starts and ends
/// at the same node, traverses every street segment at least once, and
/// minimises the re-walked distance via minimum-weight matching of the
/// odd-degree intersections.
///
/// Parameters
/// ----------
/// graph : StreetGraph
///     The street network to cover.
/// start_node_id : int, optional
///     Node to start and end the walk at. Defaults to an odd-degree
///     intersection when one exists.
/// average_speed_kmh : float, default=30.0
///     Average speed used for the duration estimate.
///
/// Returns
/// -------
/// dict
///     Route details:
///     - total_distance_m: Length of the full walk
///     - original_distance_m: Summed length of the covered segments
///     - estimated_time_ms: Duration estimate at `average_speed_kmh`
///     - edge_order: Edge index per traversal, in walk order
///     - duplicate_edges: Edge indices walked more than once
///     - unreached_edges: Edge indices outside the start component
///     - instructions: Turn-by-turn directives as dictionaries
///     - geojson: The walk and its directives as a GeoJSON string
///
/// Raises
/// ------
/// ValueError
///     If the graph has no edges or the start node is unknown or isolated.
#[pyfunction]
#[gen_stub_pyfunction]
#[pyo3(signature = (graph, start_node_id=None, average_speed_kmh=30.0))]
pub fn solve_route(
    py: Python<'_>,
    graph: &PyStreetGraph,
    start_node_id: Option<i64>,
    average_speed_kmh: f64,
) -> PyResult<PyObject> {
    let result = py
        .allow_threads(|| solve(&graph.graph, start_node_id))
        .map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Route calculation failed: {e}"
            ))
        })?;

    Ok(result_to_py(py, &result, average_speed_kmh))
}

/// Find the graph node closest to a location
///
/// Snaps an arbitrary position (typically a GPS fix) to the nearest
/// node of the street network.
///
/// Parameters
/// ----------
/// graph : StreetGraph
///     The street network to search.
/// lat : float
///     Latitude of the query position.
/// lon : float
///     Longitude of the query position.
///
/// Returns
/// -------
/// tuple[int, float] or None
///     The nearest node id and its distance in meters, or None for an
///     empty graph.
#[pyfunction]
#[gen_stub_pyfunction]
pub fn nearest_node(graph: &PyStreetGraph, lat: f64, lon: f64) -> Option<(i64, f64)> {
    graph
        .graph
        .nearest_node(&Point::new(lon, lat))
        .map(|(node, dist)| (graph.graph.node_id(node), dist))
}
