use crate::check::{PlausibilityWarning, WarningKind};
use crate::schedule::{LineId, RouteId};

use std::collections::BTreeMap;

/// The warnings of a [`PlausibilityCheck`](crate::check::PlausibilityCheck),
/// grouped by kind and ordered as the schedule is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlausibilityReport {
    warnings: BTreeMap<WarningKind, Vec<PlausibilityWarning>>,
}

impl FromIterator<PlausibilityWarning> for PlausibilityReport {
    fn from_iter<I: IntoIterator<Item = PlausibilityWarning>>(iter: I) -> Self {
        let mut warnings: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for warning in iter {
            warnings.entry(warning.kind()).or_default().push(warning);
        }

        Self { warnings }
    }
}

impl PlausibilityReport {
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.get(&kind).map_or(0, Vec::len)
    }

    pub fn warnings(&self, kind: WarningKind) -> &[PlausibilityWarning] {
        self.warnings.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Every warning raised for one route, by kind.
    pub fn for_route<'a>(
        &'a self,
        line: &'a LineId,
        route: &'a RouteId,
    ) -> impl Iterator<Item = &'a PlausibilityWarning> {
        self.iter().filter(move |warning| {
            let location = warning.location();
            &location.line == line && &location.route == route
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlausibilityWarning> {
        self.warnings.values().flatten()
    }

    pub fn kinds(&self) -> impl Iterator<Item = (WarningKind, usize)> + '_ {
        self.warnings.iter().map(|(kind, warnings)| (*kind, warnings.len()))
    }

    pub fn len(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
