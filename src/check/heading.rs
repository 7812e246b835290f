use crate::graph::Graph;
use crate::spatial::bearing;

use petgraph::graph::EdgeIndex;

/// Edges shorter than this (meters) have no meaningful heading.
pub const MIN_HEADING_LENGTH: f64 = 1.0;

/// The turn between two bearings, in degrees within `[0, 180]`.
#[inline]
pub fn turn_angle(previous: f64, current: f64) -> f64 {
    let turn = (current - previous).rem_euclid(360.0);
    if turn > 180.0 { 360.0 - turn } else { turn }
}

/// `Trip`
///
/// The headings along a mapped path. Edges without a meaningful heading,
/// such as the zero-length loops of artificial stops, are left out so that
/// their neighbours are compared with one another.
#[derive(Clone, Debug, Default)]
pub struct Trip {
    /// Path position and bearing of every edge with a heading.
    legs: Vec<(usize, f64)>,
}

impl Trip {
    pub fn new(graph: &Graph, path: &[EdgeIndex]) -> Self {
        let legs = path
            .iter()
            .enumerate()
            .filter(|(_, ix)| graph.geometric_length(**ix) >= MIN_HEADING_LENGTH)
            .map(|(position, ix)| (position, graph.edge_bearing(*ix)))
            .collect();

        Self { legs }
    }

    /// Every turn along the trip, as the path positions of the edges before
    /// and after it, and its angle.
    pub fn turns(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.legs.windows(2).filter_map(|legs| match legs {
            [(from, previous), (to, current)] => {
                Some((*from, *to, turn_angle(*previous, *current)))
            }
            _ => None,
        })
    }

}
