use crate::schedule::{LineId, RouteId, ShapeId};

use geo::LineString;
use std::collections::BTreeSet;

/// An independent polyline describing where a route is known to run.
/// Only used to score a mapping, never to produce one.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceShape {
    pub id: ShapeId,
    pub geometry: LineString,
    pub routes: BTreeSet<(LineId, RouteId)>,
}

impl ReferenceShape {
    pub fn new(id: impl Into<ShapeId>, geometry: LineString) -> Self {
        Self {
            id: id.into(),
            geometry,
            routes: BTreeSet::new(),
        }
    }

    pub fn serving(mut self, line: impl Into<LineId>, route: impl Into<RouteId>) -> Self {
        self.routes.insert((line.into(), route.into()));
        self
    }

    #[inline]
    pub fn represents(&self, line: &LineId, route: &RouteId) -> bool {
        self.routes.contains(&(line.clone(), route.clone()))
    }
}
