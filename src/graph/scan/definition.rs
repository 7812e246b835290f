use geo::Point;
use petgraph::graph::EdgeIndex;

/// Trait containing utility functions to find edges near a position.
pub trait Scan {
    /// Returns an unsorted iterator of the edges whose envelope lies within
    /// the provided `distance` of the input [point](Point).
    ///
    /// ### Note
    /// This function implements a square-scan.
    ///
    /// It therefore may select edges further away than `distance`, callers
    /// needing an exact radius must filter on the projected distance, as
    /// [`Scan::scan_edges_projected`] allows.
    fn scan_edges(&self, point: Point, distance: f64) -> impl Iterator<Item = EdgeIndex>;

    /// Returns an iterator over every edge within the specified `distance`,
    /// alongside the [projection](https://en.wikipedia.org/wiki/Projection_(linear_algebra))
    /// of the point upon the edge and the distance to that projection.
    ///
    /// Unlike [`Scan::scan_edges`], every returned edge lies within `distance`.
    fn scan_edges_projected(
        &self,
        point: Point,
        distance: f64,
    ) -> impl Iterator<Item = (EdgeIndex, Point, f64)>;
}
