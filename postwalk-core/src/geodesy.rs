//! Great-circle measures on the spherical Earth approximation.

use geo::{LineString, Point};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
///
/// Points follow the `geo` convention: `x` is longitude, `y` is latitude,
/// both in degrees.
pub fn haversine_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let phi_a = a.y().to_radians();
    let phi_b = b.y().to_radians();
    let d_phi = (b.y() - a.y()).to_radians();
    let d_lambda = (b.x() - a.x()).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial bearing from `a` to `b` in degrees clockwise from north,
/// normalised to `[0, 360)`.
pub fn initial_bearing(a: Point<f64>, b: Point<f64>) -> f64 {
    let phi_a = a.y().to_radians();
    let phi_b = b.y().to_radians();
    let d_lambda = (b.x() - a.x()).to_radians();

    let y = d_lambda.sin() * phi_b.cos();
    let x = phi_a.cos() * phi_b.sin() - phi_a.sin() * phi_b.cos() * d_lambda.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Fold an angle in degrees into the principal range `(-180, 180]`.
pub fn normalize_angle(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(360.0);
    if folded > 180.0 {
        folded - 360.0
    } else {
        folded
    }
}

/// Total haversine length of a polyline in meters.
pub fn polyline_length(line: &LineString<f64>) -> f64 {
    line.0
        .windows(2)
        .map(|w| haversine_distance(Point::from(w[0]), Point::from(w[1])))
        .sum()
}
