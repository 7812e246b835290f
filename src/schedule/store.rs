use crate::EdgeId;
use crate::error::{IntegrityError, Result};
use crate::schedule::{Line, LineId, Route, RouteId, Stop, StopId, StopIx};

use geo::Point;
use indexmap::IndexMap;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

/// The transit schedule: an arena of stops and the lines operating between them.
///
/// Lines and routes keep their insertion order, which is the order every pass
/// over the schedule visits and reports them in.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    stops: Vec<Stop>,
    lookup: FxHashMap<StopId, StopIx>,
    children: FxHashMap<(StopIx, EdgeId), StopIx>,

    lines: IndexMap<LineId, Line>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parent stop at the given position.
    pub fn add_stop(&mut self, id: impl Into<StopId>, position: Point) -> Result<StopIx> {
        let id = id.into();
        if self.lookup.contains_key(&id) {
            return Err(IntegrityError::DuplicateStop(id).into());
        }

        Ok(self.push(Stop::parent(id, position)))
    }

    /// Inserts a child stop of `parent`, anchored on `anchor`.
    ///
    /// This is how schedules which were mapped before are handed back in.
    pub fn add_child_stop(&mut self, parent: &StopId, anchor: impl Into<EdgeId>) -> Result<StopIx> {
        let parent = self.stop_ix(parent)?;
        match self.child_stop(parent, &anchor.into())? {
            (ix, true) => Ok(ix),
            (ix, false) => Err(IntegrityError::DuplicateStop(self.stops[ix.0].id.clone()).into()),
        }
    }

    /// Obtains the child of `parent` anchored on `anchor`, creating it when
    /// it does not exist yet. Returns the child and whether it was created.
    pub fn child_stop(&mut self, parent: StopIx, anchor: &EdgeId) -> Result<(StopIx, bool)> {
        let parent = self
            .parent_of(parent)
            .ok_or(IntegrityError::StaleStop(parent.0))?;
        if let Some(child) = self.children.get(&(parent, anchor.clone())) {
            return Ok((*child, false));
        }

        let child = Stop::child(parent, &self.stops[parent.0], anchor.clone());
        if self.lookup.contains_key(&child.id) {
            return Err(IntegrityError::DuplicateStop(child.id).into());
        }

        debug!("Creating child stop {}", child.id);
        let ix = self.push(child);
        self.children.insert((parent, anchor.clone()), ix);
        Ok((ix, true))
    }

    fn push(&mut self, stop: Stop) -> StopIx {
        let ix = StopIx(self.stops.len());
        self.lookup.insert(stop.id.clone(), ix);
        self.stops.push(stop);
        ix
    }

    #[inline]
    pub fn stop(&self, id: &StopId) -> Option<&Stop> {
        self.lookup.get(id).map(|ix| &self.stops[ix.0])
    }

    pub fn stop_ix(&self, id: &StopId) -> Result<StopIx> {
        self.lookup
            .get(id)
            .copied()
            .ok_or_else(|| IntegrityError::UnknownStop(id.clone()).into())
    }

    /// Indices are only valid until the next
    /// [`prune_unused_children`](Self::prune_unused_children).
    #[inline]
    pub fn stop_at(&self, ix: StopIx) -> Option<&Stop> {
        self.stops.get(ix.0)
    }

    /// The parent of a child stop, or the stop itself when it is a parent.
    #[inline]
    pub fn parent_of(&self, ix: StopIx) -> Option<StopIx> {
        self.stops.get(ix.0).map(|stop| stop.parent.unwrap_or(ix))
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    pub fn children_of(&self, parent: StopIx) -> impl Iterator<Item = &Stop> {
        self.stops
            .iter()
            .filter(move |stop| stop.parent == Some(parent))
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn add_line(&mut self, line: Line) -> Result<()> {
        if self.lines.contains_key(&line.id) {
            return Err(IntegrityError::DuplicateLine(line.id).into());
        }

        self.lines.insert(line.id.clone(), line);
        Ok(())
    }

    #[inline]
    pub fn line(&self, id: &LineId) -> Option<&Line> {
        self.lines.get(id)
    }

    #[inline]
    pub fn line_mut(&mut self, id: &LineId) -> Option<&mut Line> {
        self.lines.get_mut(id)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }

    pub fn route(&self, line: &LineId, route: &RouteId) -> Result<&Route> {
        self.lines
            .get(line)
            .ok_or_else(|| IntegrityError::UnknownLine(line.clone()))?
            .routes
            .get(route)
            .ok_or_else(|| IntegrityError::UnknownRoute(line.clone(), route.clone()).into())
    }

    pub fn route_mut(&mut self, line: &LineId, route: &RouteId) -> Result<&mut Route> {
        self.lines
            .get_mut(line)
            .ok_or_else(|| IntegrityError::UnknownLine(line.clone()))?
            .routes
            .get_mut(route)
            .ok_or_else(|| IntegrityError::UnknownRoute(line.clone(), route.clone()).into())
    }

    /// Every route of the schedule alongside its line, in insertion order.
    pub fn routes(&self) -> impl Iterator<Item = (&LineId, &Route)> {
        self.lines
            .values()
            .flat_map(|line| line.routes.values().map(move |route| (&line.id, route)))
    }

    pub fn route_count(&self) -> usize {
        self.lines.values().map(|line| line.routes.len()).sum()
    }

    /// Removes every child stop no route stop refers to, compacting the arena.
    /// Parent stops are always kept. Returns the number of stops removed.
    pub fn prune_unused_children(&mut self) -> usize {
        let referenced = self
            .routes()
            .flat_map(|(_, route)| route.stops.iter())
            .filter_map(|stop| self.lookup.get(&stop.stop).copied())
            .collect::<FxHashSet<_>>();

        let before = self.stops.len();
        let mut remap = FxHashMap::default();
        let mut kept = Vec::with_capacity(before);

        for (index, stop) in std::mem::take(&mut self.stops).into_iter().enumerate() {
            if stop.is_child() && !referenced.contains(&StopIx(index)) {
                continue;
            }

            remap.insert(StopIx(index), StopIx(kept.len()));
            kept.push(stop);
        }

        // Parents are never removed, so every parent reference resolves
        for stop in kept.iter_mut() {
            stop.parent = stop.parent.and_then(|parent| remap.get(&parent).copied());
        }

        self.lookup = kept
            .iter()
            .enumerate()
            .map(|(index, stop)| (stop.id.clone(), StopIx(index)))
            .collect();

        self.children = kept
            .iter()
            .enumerate()
            .filter_map(|(index, stop)| match (stop.parent, &stop.anchor) {
                (Some(parent), Some(anchor)) => Some(((parent, anchor.clone()), StopIx(index))),
                _ => None,
            })
            .collect();

        self.stops = kept;
        let removed = before - self.stops.len();

        debug!("Pruned {removed} unused child stops");
        removed
    }
}
