use crate::schedule::{LineId, RouteId};

/// The reason an artificial edge was planned into a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FallbackKind {
    /// No admissible edge lies within the search ceiling of the stop.
    UnmappedStop,
    /// No admissible path within the search bound reaches the stop from its predecessor.
    Disconnected,
}

/// An artificial fallback within a single route, at the position of the
/// route stop it was planned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fallback {
    pub position: usize,
    pub kind: FallbackKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackRecord {
    pub line: LineId,
    pub route: RouteId,
    pub position: usize,
    pub kind: FallbackKind,
}

/// Summary of a [`Mapper::map`](crate::mapping::Mapper::map) pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingReport {
    pub routes: usize,
    pub child_stops_created: usize,
    pub child_stops_reused: usize,
    pub artificial_edges: usize,
    pub fallbacks: Vec<FallbackRecord>,
}

impl MappingReport {
    pub fn unmapped_stops(&self) -> impl Iterator<Item = &FallbackRecord> {
        self.fallbacks
            .iter()
            .filter(|record| record.kind == FallbackKind::UnmappedStop)
    }

    pub fn disconnections(&self) -> impl Iterator<Item = &FallbackRecord> {
        self.fallbacks
            .iter()
            .filter(|record| record.kind == FallbackKind::Disconnected)
    }
}
