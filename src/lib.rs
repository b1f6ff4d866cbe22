use pyo3::prelude::*;
use pyo3_stub_gen::define_stub_info_gatherer;

use model::{py_create_street_graph, PyStreetGraph};
use routing::{nearest_node, solve_route};

pub mod model;
pub mod routing;

/// A Python module implemented in Rust.
#[pymodule]
fn postwalk(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyStreetGraph>()?;
    m.add_function(wrap_pyfunction!(py_create_street_graph, m)?)?;

    m.add_function(wrap_pyfunction!(solve_route, m)?)?;
    m.add_function(wrap_pyfunction!(nearest_node, m)?)?;
    Ok(())
}

define_stub_info_gatherer!(stub_info);
