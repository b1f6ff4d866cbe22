use geo::{LineString, Point};
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use postwalk_core::prelude::*;

/// # StreetGraph
///
/// An immutable undirected street network covering the survey area.
///
/// ## Purpose
///
/// The graph is the input to all routing operations. Whatever fetches and
/// parses the map data (an Overpass client, a PBF extract, a test fixture)
/// hands the finished node and segment lists to `create_street_graph`;
/// the solver never touches the data source itself.
///
/// ## Usage
///
/// ```python
/// graph = postwalk.create_street_graph(
///     nodes=[(1, 52.5200, 13.4050), (2, 52.5210, 13.4050)],
///     edges=[(1, 2, [(52.5200, 13.4050), (52.5210, 13.4050)], "Kastanienallee")],
/// )
/// route = postwalk.solve_route(graph, start_node_id=1)
/// ```
///
/// Edge geometries are ordered from the first endpoint to the second; the
/// segment length is derived from the geometry, so no length needs to be
/// supplied.
#[gen_stub_pyclass]
#[pyclass(name = "StreetGraph")]
pub struct PyStreetGraph {
    pub graph: StreetGraph,
}

#[gen_stub_pymethods]
#[pymethods]
impl PyStreetGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of odd-degree intersections (the matching workload).
    pub fn odd_node_count(&self) -> usize {
        self.graph.odd_degree_nodes().len()
    }

    /// Total length of all street segments in meters.
    pub fn total_length_m(&self) -> f64 {
        self.graph.total_length()
    }

    fn __repr__(&self) -> String {
        format!(
            "StreetGraph with {} nodes and {} edges ({:.0} m of streets)",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.graph.total_length()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

/// Build a street graph from plain node and edge lists
///
/// Assembles and validates the immutable street network used by
/// `solve_route`.
///
/// Parameters
/// ----------
/// nodes : list[tuple[int, float, float]]
///     Node records as `(node_id, lat, lon)`.
/// edges : list[tuple[int, int, list[tuple[float, float]], str | None]]
///     Segment records as `(from_id, to_id, geometry, name)`, where
///     `geometry` is the `(lat, lon)` polyline running from `from_id`
///     to `to_id`. Pass `None` for unnamed ways.
///
/// Returns
/// -------
/// StreetGraph
///     The validated street network.
///
/// Raises
/// ------
/// ValueError
///     If an edge references an unknown node, duplicates a node id,
///     carries fewer than two geometry points, or disagrees with its
///     endpoint coordinates.
#[pyfunction(name = "create_street_graph")]
#[gen_stub_pyfunction]
pub fn py_create_street_graph(
    nodes: Vec<(i64, f64, f64)>,
    edges: Vec<(i64, i64, Vec<(f64, f64)>, Option<String>)>,
) -> PyResult<PyStreetGraph> {
    let mut builder = StreetGraphBuilder::new();

    for (id, lat, lon) in nodes {
        builder.add_node(id, Point::new(lon, lat)).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid node {id}: {e}"))
        })?;
    }

    for (from, to, geometry, name) in edges {
        let line: LineString<f64> = geometry
            .into_iter()
            .map(|(lat, lon)| (lon, lat))
            .collect::<Vec<_>>()
            .into();
        builder.add_edge(from, to, line, name).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Invalid edge {from} -> {to}: {e}"
            ))
        })?;
    }

    Ok(PyStreetGraph {
        graph: builder.build(),
    })
}
