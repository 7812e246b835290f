use crate::error::{IntegrityError, Result};
use crate::schedule::{LineId, RouteId, StopId};
use crate::{EdgeId, Mode};

use chrono::TimeDelta;
use indexmap::IndexMap;

/// Expresses a schedule offset in (fractional) seconds.
#[inline]
pub fn as_seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

/// A visit of a [`Route`] to a stop, with its offsets from the start of the trip.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteStop {
    pub stop: StopId,

    pub arrival: Option<TimeDelta>,
    pub departure: Option<TimeDelta>,

    /// Index of the stop's anchor edge within [`Route::path`], set once mapped.
    pub path_index: Option<usize>,
}

impl RouteStop {
    pub fn new(stop: impl Into<StopId>) -> Self {
        Self {
            stop: stop.into(),
            arrival: None,
            departure: None,
            path_index: None,
        }
    }

    pub fn with_arrival(self, arrival: TimeDelta) -> Self {
        Self {
            arrival: Some(arrival),
            ..self
        }
    }

    pub fn with_departure(self, departure: TimeDelta) -> Self {
        Self {
            departure: Some(departure),
            ..self
        }
    }

    /// Sets both offsets, in seconds from the start of the trip.
    pub fn at(self, arrival: i64, departure: i64) -> Self {
        self.with_arrival(TimeDelta::seconds(arrival))
            .with_departure(TimeDelta::seconds(departure))
    }

    /// The moment the vehicle leaves the stop, falling back to its arrival.
    #[inline]
    pub fn leaves(&self) -> Option<TimeDelta> {
        self.departure.or(self.arrival)
    }

    /// The moment the vehicle reaches the stop, falling back to its departure.
    #[inline]
    pub fn reaches(&self) -> Option<TimeDelta> {
        self.arrival.or(self.departure)
    }
}

/// An ordered stop pattern operated with a single mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: RouteId,
    pub mode: Mode,
    pub stops: Vec<RouteStop>,

    /// The mapped path, a contiguous sequence of edges once mapped.
    pub path: Vec<EdgeId>,
}

impl Route {
    pub fn new(id: impl Into<RouteId>, mode: impl Into<Mode>) -> Self {
        Self {
            id: id.into(),
            mode: mode.into(),
            stops: vec![],
            path: vec![],
        }
    }

    pub fn with_stop(mut self, stop: RouteStop) -> Self {
        self.stops.push(stop);
        self
    }

    pub fn with_stops(mut self, stops: impl IntoIterator<Item = RouteStop>) -> Self {
        self.stops.extend(stops);
        self
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        !self.path.is_empty() && self.stops.iter().all(|stop| stop.path_index.is_some())
    }

    /// The anchor positions of every mapped stop, in stop order.
    pub fn anchors(&self) -> impl Iterator<Item = usize> + '_ {
        self.stops.iter().filter_map(|stop| stop.path_index)
    }
}

/// A group of routes published under one name.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub id: LineId,
    pub routes: IndexMap<RouteId, Route>,
}

impl Line {
    pub fn new(id: impl Into<LineId>) -> Self {
        Self {
            id: id.into(),
            routes: IndexMap::new(),
        }
    }

    pub fn add_route(&mut self, route: Route) -> Result<()> {
        if self.routes.contains_key(&route.id) {
            return Err(IntegrityError::DuplicateRoute(self.id.clone(), route.id).into());
        }

        self.routes.insert(route.id.clone(), route);
        Ok(())
    }

    pub fn with_route(mut self, route: Route) -> Result<Self> {
        self.add_route(route)?;
        Ok(self)
    }
}
