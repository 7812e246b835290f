use crate::graph::Edge;

use serde::{Deserialize, Serialize};

/// Integer path cost, in hundredths of the [`CostModel`] unit.
pub type Cost = u64;

/// Number of cost units per meter (or second).
pub const PRECISION: f64 = 100.0;

/// The quantity minimised when connecting two stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    /// Edge length in meters.
    #[default]
    Length,
    /// Free-flow travel time in seconds.
    TravelTime,
}

impl CostModel {
    /// The cost of traversing `edge` once.
    #[inline]
    pub fn edge_cost(&self, edge: &Edge) -> Cost {
        match self {
            CostModel::Length => to_cost(edge.length),
            CostModel::TravelTime => to_cost(edge.travel_time()),
        }
    }

    /// The cost of travelling `distance` meters in a straight line at `speed`.
    #[inline]
    pub fn beeline_cost(&self, distance: f64, speed: f64) -> Cost {
        match self {
            CostModel::Length => to_cost(distance),
            CostModel::TravelTime if speed > 0.0 => to_cost(distance / speed),
            CostModel::TravelTime => Cost::MAX,
        }
    }
}

/// Converts a measure in meters (or seconds) into an integer cost,
/// saturating on infinite and negative values.
#[inline]
pub fn to_cost(value: f64) -> Cost {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        // Saturating float-to-int conversion
        (value * PRECISION).round() as Cost
    }
}
