//! Planar geometry helpers shared by the mapping, checking and analysis passes.
//!
//! The network lives in a projected, metric coordinate system, so every
//! measurement here is Euclidean. Geographic inputs (reference shapes) are
//! brought into that system through a [`Projection`].

pub mod project;

pub use project::{Equirectangular, Planar, Projection, WebMercator};

use geo::{Closest, ClosestPoint, Distance, Euclidean, Line, LineString, Point};

/// Projects `point` onto the closest position of the `line` segment.
///
/// Degenerate (zero-length) lines project every point onto their start.
#[inline]
pub fn project_onto(line: &Line, point: Point) -> Point {
    match line.closest_point(&point) {
        Closest::Intersection(projected) | Closest::SinglePoint(projected) => projected,
        Closest::Indeterminate => line.start_point(),
    }
}

/// The planar distance between `point` and the closest position of the `line` segment.
#[inline]
pub fn distance_to_line(line: &Line, point: Point) -> f64 {
    Euclidean.distance(project_onto(line, point), point)
}

/// The smallest planar distance between `point` and any segment of the `linestring`.
/// Returns `None` for linestrings without a segment.
pub fn distance_to_linestring(linestring: &LineString, point: Point) -> Option<f64> {
    linestring
        .lines()
        .map(|line| distance_to_line(&line, point))
        .min_by(f64::total_cmp)
}

/// The planar bearing from `from` towards `to`, in degrees clockwise
/// from the positive y-axis (grid north), within `[0, 360)`.
///
/// ### Example
/// ```rust
/// use geo::Point;
/// use ptmap::spatial::bearing;
///
/// let east = bearing(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
/// assert!((east - 90.0).abs() < 1e-9);
/// ```
#[inline]
pub fn bearing(from: Point, to: Point) -> f64 {
    let (dx, dy) = (to.x() - from.x(), to.y() - from.y());
    dx.atan2(dy).to_degrees().rem_euclid(360.0)
}
