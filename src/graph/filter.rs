use crate::Mode;
use crate::graph::Edge;

use std::collections::BTreeSet;

/// The set of network modes a schedule mode may travel on.
///
/// An edge passes the filter when it is not artificial and was supplied with
/// at least one of the filter's modes. Modes assigned while mapping routes are
/// not considered, so the outcome does not depend on mapping order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeFilter(BTreeSet<Mode>);

impl ModeFilter {
    pub fn new(modes: impl IntoIterator<Item = Mode>) -> Self {
        Self(modes.into_iter().collect())
    }

    /// A filter admitting only edges which permit exactly this mode.
    pub fn single(mode: &Mode) -> Self {
        Self(BTreeSet::from([mode.clone()]))
    }

    #[inline]
    pub fn admits(&self, edge: &Edge) -> bool {
        !edge.artificial && edge.modes.iter().any(|mode| self.0.contains(mode))
    }

    pub fn modes(&self) -> impl Iterator<Item = &Mode> {
        self.0.iter()
    }
}
