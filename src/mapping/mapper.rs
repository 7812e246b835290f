use crate::config::MappingConfig;
use crate::error::{IntegrityError, Result};
use crate::graph::{Graph, ModeFilter};
use crate::mapping::path::{Endpoint, PathBuilder, PlannedEdge, RoutePlan, Waypoint};
use crate::mapping::report::{FallbackKind, FallbackRecord, MappingReport};
use crate::mapping::Cost;
use crate::schedule::{LineId, Route, RouteId, Schedule, StopId, as_seconds};
use crate::{EdgeId, Mode};

use log::{debug, info, warn};
use measure_time::{debug_time, info_time};
use petgraph::graph::{EdgeIndex, NodeIndex};
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::Level;

/// A route awaiting its plan.
struct Job {
    line: LineId,
    route: RouteId,
    mode: Mode,
    waypoints: Vec<Waypoint>,
}

/// Maps every route of a [`Schedule`] onto a [`Graph`].
///
/// Routes are planned in parallel against the unchanged graph, then
/// materialised one after the other in schedule order: artificial edges are
/// created, route stops are bound to child stops on their anchor edges, and
/// the route mode is allowed on every edge of the path.
///
/// ### Example
/// ```rust
/// use geo::Point;
/// use ptmap::config::MappingConfig;
/// use ptmap::graph::{Edge, Graph, Vertex};
/// use ptmap::mapping::Mapper;
/// use ptmap::schedule::{Line, Route, RouteStop, Schedule};
/// use ptmap::EdgeId;
///
/// let mut graph = Graph::new();
/// graph.add_vertex(Vertex::new("a", Point::new(0.0, 0.0)))?;
/// graph.add_vertex(Vertex::new("b", Point::new(200.0, 0.0)))?;
/// graph.add_edge(Edge::new("ab", "a", "b").with_modes(["bus"]))?;
///
/// let mut schedule = Schedule::new();
/// schedule.add_stop("s1", Point::new(20.0, 5.0))?;
/// schedule.add_stop("s2", Point::new(180.0, 5.0))?;
///
/// let route = Route::new("r1", "bus")
///     .with_stops([RouteStop::new("s1"), RouteStop::new("s2")]);
/// schedule.add_line(Line::new("l1").with_route(route)?)?;
///
/// let report = Mapper::new(MappingConfig::default())?.map(&mut graph, &mut schedule)?;
///
/// assert_eq!(report.child_stops_created, 2);
/// assert_eq!(schedule.route(&"l1".into(), &"r1".into())?.path, vec![EdgeId::from("ab")]);
/// # Ok::<(), ptmap::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Mapper {
    config: MappingConfig,
}

impl Mapper {
    pub fn new(config: MappingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Maps every route of the schedule, replacing any previous mapping.
    ///
    /// Mapping an already mapped schedule against the same graph
    /// reproduces the same child stops and paths.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::INFO, skip_all))]
    pub fn map(&self, graph: &mut Graph, schedule: &mut Schedule) -> Result<MappingReport> {
        info_time!("Mapped schedule");
        self.validate(graph, schedule)?;

        let jobs = schedule
            .routes()
            .map(|(line, route)| -> Result<Job> {
                Ok(Job {
                    line: line.clone(),
                    route: route.id.clone(),
                    mode: route.mode.clone(),
                    waypoints: self.waypoints(schedule, route)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let plans = {
            debug_time!("Planned {} routes", jobs.len());
            let builder = PathBuilder::new(graph, &self.config);

            jobs.par_iter()
                .map(|job| builder.plan(&job.waypoints, &self.config.mode_filter(&job.mode)))
                .collect::<Vec<_>>()
        };

        let mut report = MappingReport::default();

        debug_time!("Materialised {} routes", jobs.len());
        for (job, plan) in jobs.into_iter().zip(plans) {
            self.materialise(graph, schedule, job, plan, &mut report)?;
        }

        info!(
            "Mapped {} routes, {} child stops created, {} reused, {} artificial edges",
            report.routes,
            report.child_stops_created,
            report.child_stops_reused,
            report.artificial_edges
        );

        Ok(report)
    }

    /// Plans a single route against the graph, without applying the plan.
    pub fn plan_route(
        &self,
        graph: &Graph,
        schedule: &Schedule,
        line: &LineId,
        route: &RouteId,
    ) -> Result<RoutePlan> {
        let route = schedule.route(line, route)?;
        let waypoints = self.waypoints(schedule, route)?;

        Ok(PathBuilder::new(graph, &self.config)
            .plan(&waypoints, &self.config.mode_filter(&route.mode)))
    }

    /// Binds the route stop at `position` to `edge`, and re-derives only the
    /// spans joining it to the anchors of the neighbouring stops.
    ///
    /// The path before the previous anchor and after the next anchor is kept
    /// as is, the anchors of later stops shift by the length difference of
    /// the re-derived spans.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, level = Level::INFO))]
    pub fn reanchor(
        &self,
        graph: &mut Graph,
        schedule: &mut Schedule,
        line: &LineId,
        route: &RouteId,
        position: usize,
        edge: &EdgeId,
    ) -> Result<()> {
        let mapped = schedule.route(line, route)?;
        if position >= mapped.stops.len() {
            let error = IntegrityError::PositionOutOfRange(line.clone(), route.clone(), position);
            return Err(error.into());
        }

        if !mapped.is_mapped() {
            return Err(IntegrityError::RouteNotMapped(line.clone(), route.clone()).into());
        }

        let anchor = graph.edge_ix(edge)?;
        let path = graph.edge_ixs(&mapped.path)?;
        let anchors = checked_anchors(line, mapped, path.len())?;
        let waypoints = self.waypoints(schedule, mapped)?;
        let filter = self.config.mode_filter(&mapped.mode);
        let mode = mapped.mode.clone();

        let mut spliced = match position.checked_sub(1) {
            Some(previous) => path[..=anchors[previous]].to_vec(),
            None => vec![],
        };

        if let Some(&last) = spliced.last() {
            if last != anchor {
                let bound = self.bound(graph, &waypoints[position - 1], &waypoints[position]);
                spliced.extend(self.connect(graph, last, anchor, &filter, bound)?);
                spliced.push(anchor);
            }
        } else {
            spliced.push(anchor);
        }

        let anchor_index = spliced.len() - 1;
        let shift = match anchors.get(position + 1) {
            Some(&next_index) if path[next_index] == anchor => {
                spliced.extend_from_slice(&path[next_index + 1..]);
                anchor_index as isize - next_index as isize
            }
            Some(&next_index) => {
                let bound = self.bound(graph, &waypoints[position], &waypoints[position + 1]);
                spliced.extend(self.connect(graph, anchor, path[next_index], &filter, bound)?);

                let shift = spliced.len() as isize - next_index as isize;
                spliced.extend_from_slice(&path[next_index..]);
                shift
            }
            None => 0,
        };

        let anchors = anchors
            .iter()
            .enumerate()
            .map(|(index, existing)| match index.cmp(&position) {
                std::cmp::Ordering::Less => *existing,
                std::cmp::Ordering::Equal => anchor_index,
                std::cmp::Ordering::Greater => (*existing as isize + shift) as usize,
            })
            .collect::<Vec<_>>();

        debug!(
            "Re-anchored stop {position} of {line}/{route} onto {edge}, path {} -> {} edges",
            path.len(),
            spliced.len()
        );

        self.bind(graph, schedule, line, route, &mode, &spliced, &anchors)?;
        Ok(())
    }

    /// Checks every reference the schedule makes into itself and into the graph.
    fn validate(&self, graph: &Graph, schedule: &Schedule) -> Result<()> {
        for stop in schedule.stops() {
            if let Some(anchor) = &stop.anchor {
                graph.edge_ix(anchor)?;
            }
        }

        for (_, route) in schedule.routes() {
            for stop in &route.stops {
                schedule.stop_ix(&stop.stop)?;
            }

            graph.edge_ixs(&route.path)?;
        }

        Ok(())
    }

    /// Resolves the stops of a route to their parents.
    fn waypoints(&self, schedule: &Schedule, route: &Route) -> Result<Vec<Waypoint>> {
        route
            .stops
            .iter()
            .map(|visit| {
                let ix = schedule.stop_ix(&visit.stop)?;
                let parent = schedule
                    .parent_of(ix)
                    .and_then(|parent| schedule.stop_at(parent))
                    .ok_or_else(|| IntegrityError::UnknownStop(visit.stop.clone()))?;

                Ok(Waypoint::new(parent.id.clone(), parent.position).at(
                    visit.arrival.map(as_seconds),
                    visit.departure.map(as_seconds),
                ))
            })
            .collect()
    }

    fn bound(&self, graph: &Graph, from: &Waypoint, to: &Waypoint) -> Cost {
        PathBuilder::new(graph, &self.config).bound(from, to)
    }

    /// The edges joining the end of `from` to the start of `to`, bridged by an
    /// artificial connector when no admissible path exists within `bound`.
    fn connect(
        &self,
        graph: &mut Graph,
        from: EdgeIndex,
        to: EdgeIndex,
        filter: &ModeFilter,
        bound: Cost,
    ) -> Result<Vec<EdgeIndex>> {
        let (source, target) = (graph.target(from), graph.source(to));
        let found =
            PathBuilder::new(graph, &self.config).shortest_path(source, target, filter, bound);

        match found {
            Some((edges, _)) => Ok(edges),
            None => {
                warn!(
                    "No path from {} to {} within the search bound, bridging artificially",
                    graph.edge_at(from).id,
                    graph.edge_at(to).id
                );

                let (connector, _) =
                    graph.artificial_connector(source, target, self.config.artificial_speed)?;
                Ok(vec![connector])
            }
        }
    }

    fn resolve(&self, graph: &mut Graph, endpoint: &Endpoint) -> Result<NodeIndex> {
        match endpoint {
            Endpoint::Vertex(ix) => Ok(*ix),
            Endpoint::Stop(stop, position) => graph.artificial_stop_vertex(stop, *position),
        }
    }

    fn materialise(
        &self,
        graph: &mut Graph,
        schedule: &mut Schedule,
        job: Job,
        plan: RoutePlan,
        report: &mut MappingReport,
    ) -> Result<()> {
        let speed = self.config.artificial_speed;
        let mut path = Vec::with_capacity(plan.edges.len());

        for planned in &plan.edges {
            let (ix, created) = match planned {
                PlannedEdge::Existing(ix) => (*ix, false),
                PlannedEdge::ArtificialStop { stop, position } => {
                    graph.artificial_stop_edge(stop, *position, speed)?
                }
                PlannedEdge::Connector { from, to } => {
                    let from = self.resolve(graph, from)?;
                    let to = self.resolve(graph, to)?;
                    graph.artificial_connector(from, to, speed)?
                }
            };

            report.artificial_edges += usize::from(created);
            path.push(ix);
        }

        for fallback in plan.fallbacks {
            let stop = job
                .waypoints
                .get(fallback.position)
                .map(|waypoint| waypoint.stop.to_string())
                .unwrap_or_default();

            match fallback.kind {
                FallbackKind::UnmappedStop => warn!(
                    "Stop {stop} ({}/{} #{}) has no candidate edge, anchoring it artificially",
                    job.line, job.route, fallback.position
                ),
                FallbackKind::Disconnected => warn!(
                    "Stop {stop} ({}/{} #{}) is unreachable from its predecessor, bridging it",
                    job.line, job.route, fallback.position
                ),
            }

            report.fallbacks.push(FallbackRecord {
                line: job.line.clone(),
                route: job.route.clone(),
                position: fallback.position,
                kind: fallback.kind,
            });
        }

        let (created, reused) =
            self.bind(graph, schedule, &job.line, &job.route, &job.mode, &path, &plan.anchors)?;

        report.child_stops_created += created;
        report.child_stops_reused += reused;
        report.routes += 1;
        Ok(())
    }

    /// Writes a resolved path into the route, binding every route stop to the
    /// child stop on its anchor edge. Returns the child stops created and reused.
    #[allow(clippy::too_many_arguments)]
    fn bind(
        &self,
        graph: &mut Graph,
        schedule: &mut Schedule,
        line: &LineId,
        route: &RouteId,
        mode: &Mode,
        path: &[EdgeIndex],
        anchors: &[usize],
    ) -> Result<(usize, usize)> {
        for ix in path {
            graph.allow_mode(*ix, mode);
        }

        let ids = path
            .iter()
            .map(|ix| graph.edge_at(*ix).id.clone())
            .collect::<Vec<_>>();

        let visits = schedule
            .route(line, route)?
            .stops
            .iter()
            .map(|visit| visit.stop.clone())
            .collect::<Vec<StopId>>();

        let (mut created, mut reused) = (0, 0);
        let mut bound = Vec::with_capacity(visits.len());

        for (position, stop_id) in visits.iter().enumerate() {
            let Some(anchor) = anchors.get(position).and_then(|index| ids.get(*index)) else {
                let error = IntegrityError::InvalidAnchor(line.clone(), route.clone(), position);
                return Err(error.into());
            };

            let stop = schedule.stop_ix(stop_id)?;
            let (child, fresh) = schedule.child_stop(stop, anchor)?;

            if fresh {
                created += 1;
            } else {
                reused += 1;
            }

            let child = schedule
                .stop_at(child)
                .ok_or_else(|| IntegrityError::UnknownStop(stop_id.clone()))?;
            bound.push(child.id.clone());
        }

        let mapped = schedule.route_mut(line, route)?;
        for ((visit, stop), index) in mapped.stops.iter_mut().zip(bound).zip(anchors) {
            visit.stop = stop;
            visit.path_index = Some(*index);
        }

        mapped.path = ids;
        Ok((created, reused))
    }
}

/// The anchor of every route stop, provided each lies on the path and none
/// precedes the anchor of an earlier stop.
fn checked_anchors(line: &LineId, route: &Route, path_len: usize) -> Result<Vec<usize>> {
    let mut anchors: Vec<usize> = Vec::with_capacity(route.stops.len());

    for (position, stop) in route.stops.iter().enumerate() {
        match stop.path_index {
            Some(index) if index < path_len && anchors.last().is_none_or(|last| *last <= index) => {
                anchors.push(index)
            }
            _ => {
                let error = IntegrityError::InvalidAnchor(line.clone(), route.id.clone(), position);
                return Err(error.into());
            }
        }
    }

    Ok(anchors)
}
