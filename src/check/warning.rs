use crate::EdgeId;
use crate::schedule::{LineId, RouteId, StopId};

use strum::{Display, EnumDiscriminants, EnumIter};

/// Where in the schedule a warning was raised.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WarningLocation {
    pub line: LineId,
    pub route: RouteId,

    /// Index into the route path of the first offending edge.
    pub path_position: usize,
    /// Index of the route stop anchored at `path_position`, if any.
    pub stop_position: Option<usize>,
}

/// An anomaly found in a mapped route.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(WarningKind), derive(Hash, PartialOrd, Ord, Display, EnumIter))]
pub enum PlausibilityWarning {
    /// The path uses an edge synthesized by the mapping engine.
    ArtificialLink {
        location: WarningLocation,
        edge: EdgeId,
    },

    /// The path turns back on itself, or returns to a vertex it recently
    /// left without serving a stop along the way.
    Loop {
        location: WarningLocation,
        edges: Vec<EdgeId>,
    },

    /// The heading changes by more than the mode allows between two edges.
    DirectionChange {
        location: WarningLocation,
        from: EdgeId,
        to: EdgeId,
        angle: f64,
        threshold: f64,
    },

    /// The free-flow time between two stops disagrees with the schedule, in seconds.
    TravelTime {
        location: WarningLocation,
        from_stop: StopId,
        to_stop: StopId,
        scheduled: f64,
        actual: f64,
    },
}

impl PlausibilityWarning {
    #[inline]
    pub fn kind(&self) -> WarningKind {
        WarningKind::from(self)
    }

    pub fn location(&self) -> &WarningLocation {
        match self {
            PlausibilityWarning::ArtificialLink { location, .. }
            | PlausibilityWarning::Loop { location, .. }
            | PlausibilityWarning::DirectionChange { location, .. }
            | PlausibilityWarning::TravelTime { location, .. } => location,
        }
    }
}
