use crate::EdgeId;
use crate::schedule::StopId;

use geo::Point;

/// Separates the parent identifier from the anchor edge in a child stop identifier.
pub const CHILD_SEPARATOR: &str = ".link:";

/// Arena index of a [`Stop`] within its [`Schedule`](crate::schedule::Schedule).
///
/// Indices are stable until
/// [`prune_unused_children`](crate::schedule::Schedule::prune_unused_children)
/// compacts the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StopIx(pub(crate) usize);

impl StopIx {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A stop facility.
///
/// Parent stops carry the position reported by the timetable and are never
/// bound to the network. Child stops are copies of a parent bound to exactly
/// one anchor edge, the edge vehicles board and alight on.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub position: Point,

    pub anchor: Option<EdgeId>,
    pub parent: Option<StopIx>,
}

impl Stop {
    pub(crate) fn parent(id: StopId, position: Point) -> Self {
        Self {
            id,
            position,
            anchor: None,
            parent: None,
        }
    }

    pub(crate) fn child(parent_ix: StopIx, parent: &Stop, anchor: EdgeId) -> Self {
        Self {
            id: Self::child_id(&parent.id, &anchor),
            position: parent.position,
            anchor: Some(anchor),
            parent: Some(parent_ix),
        }
    }

    /// The identifier given to the child of `parent` anchored on `anchor`.
    pub fn child_id(parent: &StopId, anchor: &EdgeId) -> StopId {
        StopId::new(format!("{parent}{CHILD_SEPARATOR}{anchor}"))
    }

    #[inline]
    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }
}
