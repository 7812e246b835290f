use crate::{EdgeId, Mode, VertexId};

use geo::{Line, Point};
use petgraph::graph::EdgeIndex;
use rstar::AABB;
use std::collections::BTreeSet;

/// The freespeed (m/s) given to edges which do not specify one, 50km/h.
pub const DEFAULT_FREESPEED: f64 = 50.0 / 3.6;

/// A vertex of the network, positioned in the network's planar coordinate system (meters).
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub position: Point,
}

impl Vertex {
    pub fn new(id: impl Into<VertexId>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// A directed edge of the network.
///
/// A bidirectional physical segment is represented as two edges. Edges
/// which are synthesized by the mapping engine are flagged as
/// [artificial](#field.artificial), and are never offered as candidates
/// or traversed by the path search.
///
/// ### Example
/// ```rust
/// use ptmap::graph::Edge;
///
/// let edge = Edge::new("ab", "a", "b")
///     .with_length(120.0)
///     .with_freespeed(8.3)
///     .with_modes(["bus", "car"]);
///
/// assert!(edge.permits(&"bus".into()));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: VertexId,
    pub target: VertexId,

    /// Length in meters. When left unset, the graph assigns the
    /// straight-line distance between the vertices on insertion.
    pub length: f64,
    /// Free-flow speed in meters per second.
    pub freespeed: f64,
    /// Lane (capacity) attribute, carried through untouched.
    pub lanes: f64,

    /// Modes the edge was supplied with. Candidate searches only look here.
    pub modes: BTreeSet<Mode>,
    /// Modes added by mapping routes over the edge.
    pub assigned: BTreeSet<Mode>,
    pub artificial: bool,
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<VertexId>,
        target: impl Into<VertexId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            length: f64::NAN,
            freespeed: DEFAULT_FREESPEED,
            lanes: 1.0,
            modes: BTreeSet::new(),
            assigned: BTreeSet::new(),
            artificial: false,
        }
    }

    pub fn with_length(self, length: f64) -> Self {
        Self { length, ..self }
    }

    pub fn with_freespeed(self, freespeed: f64) -> Self {
        Self { freespeed, ..self }
    }

    pub fn with_lanes(self, lanes: f64) -> Self {
        Self { lanes, ..self }
    }

    pub fn with_modes<M: Into<Mode>>(self, modes: impl IntoIterator<Item = M>) -> Self {
        Self {
            modes: modes.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn as_artificial(self) -> Self {
        Self {
            artificial: true,
            ..self
        }
    }

    #[inline]
    pub fn permits(&self, mode: &Mode) -> bool {
        self.modes.contains(mode) || self.assigned.contains(mode)
    }

    /// Free-flow traversal time in seconds. Edges without a positive
    /// freespeed cannot be traversed in finite time.
    #[inline]
    pub fn travel_time(&self) -> f64 {
        if self.freespeed > 0.0 {
            self.length / self.freespeed
        } else {
            f64::INFINITY
        }
    }

    #[inline]
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

/// The spatial-index entry of an edge, its straight-line geometry.
#[derive(Clone, Debug)]
pub(crate) struct IndexedEdge {
    pub(crate) ix: EdgeIndex,
    pub(crate) line: Line,
}

impl rstar::RTreeObject for IndexedEdge {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.line.start_point(), self.line.end_point())
    }
}
