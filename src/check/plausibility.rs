use crate::check::heading::Trip;
use crate::check::{PlausibilityReport, PlausibilityWarning, WarningLocation};
use crate::config::{PlausibilityConfig, ToleranceRange};
use crate::error::Result;
use crate::graph::Graph;
use crate::schedule::{LineId, Route, Schedule, as_seconds};

use log::{debug, info};
use measure_time::debug_time;
use petgraph::graph::{EdgeIndex, NodeIndex};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

#[cfg(feature = "tracing")]
use tracing::Level;

/// Scans mapped routes for anomalies, without modifying them.
///
/// Every mode operated in the schedule must have a direction change
/// threshold configured, otherwise the check refuses to run.
#[derive(Clone, Debug)]
pub struct PlausibilityCheck {
    config: PlausibilityConfig,
}

/// The per-route view the individual rules work on.
struct RouteScan<'a> {
    graph: &'a Graph,
    line: &'a LineId,
    route: &'a Route,
    path: Vec<EdgeIndex>,

    /// Route stop anchored on each path position, the first one for shared anchors.
    anchored: FxHashMap<usize, usize>,
    /// Whether the route ends at the stop it started from.
    round_trip: bool,
}

impl RouteScan<'_> {
    fn location(&self, path_position: usize) -> WarningLocation {
        WarningLocation {
            line: self.line.clone(),
            route: self.route.id.clone(),
            path_position,
            stop_position: self.anchored.get(&path_position).copied(),
        }
    }

    fn vertices(&self) -> Vec<NodeIndex> {
        let first = self.path.first().map(|ix| self.graph.source(*ix));
        first
            .into_iter()
            .chain(self.path.iter().map(|ix| self.graph.target(*ix)))
            .collect()
    }

    fn is_reversal(&self, position: usize) -> bool {
        let Some(previous) = position.checked_sub(1).map(|p| self.path[p]) else {
            return false;
        };

        let (from, to) = self.graph.endpoints(previous);
        from != to && self.graph.endpoints(self.path[position]) == (to, from)
    }
}

impl PlausibilityCheck {
    pub fn new(config: &PlausibilityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
        })
    }

    /// Checks every mapped route of the schedule.
    /// Routes which were not mapped yet are skipped.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::INFO, skip_all))]
    pub fn run(&self, graph: &Graph, schedule: &Schedule) -> Result<PlausibilityReport> {
        debug_time!("Checked plausibility");

        for (_, route) in schedule.routes() {
            self.config.threshold(&route.mode)?;
        }

        let routes = schedule.routes().collect::<Vec<_>>();
        let warnings = routes
            .par_iter()
            .map(|(line, route)| self.check_route(graph, schedule, line, route))
            .collect::<Result<Vec<_>>>()?;

        let report = warnings.into_iter().flatten().collect::<PlausibilityReport>();
        info!("Found {} warnings across {} routes", report.len(), routes.len());

        Ok(report)
    }

    /// Checks a single route, in path order.
    pub fn check_route(
        &self,
        graph: &Graph,
        schedule: &Schedule,
        line: &LineId,
        route: &Route,
    ) -> Result<Vec<PlausibilityWarning>> {
        if route.path.is_empty() {
            debug!("Skipping unmapped route {line}/{}", route.id);
            return Ok(vec![]);
        }

        let mut anchored = FxHashMap::default();
        for (position, stop) in route.stops.iter().enumerate() {
            if let Some(index) = stop.path_index {
                anchored.entry(index).or_insert(position);
            }
        }

        let round_trip = match (route.stops.first(), route.stops.last()) {
            (Some(first), Some(last)) if route.stops.len() > 1 => {
                let first = schedule.stop_ix(&first.stop)?;
                let last = schedule.stop_ix(&last.stop)?;
                schedule.parent_of(first) == schedule.parent_of(last)
            }
            _ => false,
        };

        let scan = RouteScan {
            graph,
            line,
            route,
            path: graph.edge_ixs(&route.path)?,
            anchored,
            round_trip,
        };

        let threshold = self.config.threshold(&route.mode)?;

        let mut warnings = self.artificial_links(&scan);
        warnings.extend(self.loops(&scan));
        warnings.extend(self.direction_changes(&scan, threshold));
        warnings.extend(self.travel_times(&scan, self.config.travel_time_tolerance));

        Ok(warnings)
    }

    fn artificial_links(&self, scan: &RouteScan) -> Vec<PlausibilityWarning> {
        scan.path
            .iter()
            .enumerate()
            .filter(|(_, ix)| scan.graph.edge_at(**ix).artificial)
            .map(|(position, ix)| PlausibilityWarning::ArtificialLink {
                location: scan.location(position),
                edge: scan.graph.edge_at(*ix).id.clone(),
            })
            .collect()
    }

    /// Flags immediate reversals, and vertices revisited within the loop
    /// window where the enclosed edges serve no stop.
    fn loops(&self, scan: &RouteScan) -> Vec<PlausibilityWarning> {
        let edges = |range: std::ops::Range<usize>| {
            scan.path[range]
                .iter()
                .map(|ix| scan.graph.edge_at(*ix).id.clone())
                .collect::<Vec<_>>()
        };

        let mut warnings = (1..scan.path.len())
            .filter(|position| scan.is_reversal(*position))
            .map(|position| PlausibilityWarning::Loop {
                location: scan.location(position - 1),
                edges: edges(position - 1..position + 1),
            })
            .collect::<Vec<_>>();

        let vertices = scan.vertices();
        let closing = vertices.len() - 1;
        let mut last_seen = FxHashMap::default();
        let mut reported_until = 0;

        for (index, vertex) in vertices.iter().enumerate() {
            if let Some(start) = last_seen.insert(*vertex, index) {
                // Revisits within a loop already reported belong to it
                if start < reported_until {
                    continue;
                }

                let span = index - start;

                // Self-loops and reversals are not revisits of their own
                let trivial = span == 1 || (span == 2 && scan.is_reversal(start + 1));
                let served = scan.anchored.keys().any(|anchor| (start..index).contains(anchor));
                let terminus = scan.round_trip && index == closing;

                if !trivial && !served && !terminus && span <= self.config.loop_window {
                    reported_until = index;
                    warnings.push(PlausibilityWarning::Loop {
                        location: scan.location(start),
                        edges: edges(start..index),
                    });
                }
            }
        }

        warnings.sort_by_key(|warning| warning.location().path_position);
        warnings
    }

    fn direction_changes(&self, scan: &RouteScan, threshold: f64) -> Vec<PlausibilityWarning> {
        Trip::new(scan.graph, &scan.path)
            .turns()
            .filter(|(_, _, angle)| *angle > threshold)
            .map(|(from, to, angle)| PlausibilityWarning::DirectionChange {
                location: scan.location(to),
                from: scan.graph.edge_at(scan.path[from]).id.clone(),
                to: scan.graph.edge_at(scan.path[to]).id.clone(),
                angle,
                threshold,
            })
            .collect()
    }

    fn travel_times(
        &self,
        scan: &RouteScan,
        tolerance: ToleranceRange,
    ) -> Vec<PlausibilityWarning> {
        scan.route
            .stops
            .windows(2)
            .filter_map(|pair| {
                let [from, to] = pair else { return None };

                let (start, end) = (from.path_index?, to.path_index?);
                let scheduled = as_seconds(to.reaches()? - from.leaves()?);

                let actual = scan
                    .path
                    .get(start + 1..=end)
                    .unwrap_or_default()
                    .iter()
                    .map(|ix| scan.graph.edge_at(*ix).travel_time())
                    .sum::<f64>();

                (!tolerance.admits(scheduled, actual)).then(|| PlausibilityWarning::TravelTime {
                    location: scan.location(end),
                    from_stop: from.stop.clone(),
                    to_stop: to.stop.clone(),
                    scheduled,
                    actual,
                })
            })
            .collect()
    }
}
