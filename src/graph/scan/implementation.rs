use crate::graph::{Graph, Scan};
use crate::spatial::project_onto;

use geo::{Distance, Euclidean, Point};
use petgraph::graph::EdgeIndex;
use rstar::AABB;

#[cfg(feature = "tracing")]
use tracing::Level;

impl Scan for Graph {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::TRACE, skip(self)))]
    #[inline]
    fn scan_edges(&self, point: Point, distance: f64) -> impl Iterator<Item = EdgeIndex> {
        let bottom_left = Point::new(point.x() - distance, point.y() - distance);
        let top_right = Point::new(point.x() + distance, point.y() + distance);

        let bbox = AABB::from_corners(bottom_left, top_right);
        self.index
            .locate_in_envelope_intersecting(&bbox)
            .map(|entry| entry.ix)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::TRACE, skip(self)))]
    #[inline]
    fn scan_edges_projected(
        &self,
        point: Point,
        distance: f64,
    ) -> impl Iterator<Item = (EdgeIndex, Point, f64)> {
        let bottom_left = Point::new(point.x() - distance, point.y() - distance);
        let top_right = Point::new(point.x() + distance, point.y() + distance);

        let bbox = AABB::from_corners(bottom_left, top_right);
        self.index
            .locate_in_envelope_intersecting(&bbox)
            .filter_map(move |entry| {
                let projected = project_onto(&entry.line, point);
                let offset = Euclidean.distance(projected, point);

                (offset <= distance).then_some((entry.ix, projected, offset))
            })
    }
}
