use crate::config::MappingConfig;
use crate::graph::{Graph, ModeFilter};
use crate::mapping::candidate::{Candidate, CandidateFinder};
use crate::mapping::dijkstra::{Dijkstra, Reach};
use crate::mapping::report::{Fallback, FallbackKind};
use crate::mapping::{Cost, to_cost};
use crate::schedule::StopId;

use geo::{Distance, Euclidean, Point};
use itertools::Itertools;
use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

#[cfg(feature = "tracing")]
use tracing::Level;

/// A stop of the route being planned, resolved to its parent stop.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub stop: StopId,
    pub position: Point,

    /// Scheduled arrival, in seconds from the start of the trip.
    pub arrival: Option<f64>,
    /// Scheduled departure, in seconds from the start of the trip.
    pub departure: Option<f64>,
}

impl Waypoint {
    pub fn new(stop: impl Into<StopId>, position: Point) -> Self {
        Self {
            stop: stop.into(),
            position,
            arrival: None,
            departure: None,
        }
    }

    pub fn at(self, arrival: Option<f64>, departure: Option<f64>) -> Self {
        Self {
            arrival,
            departure,
            ..self
        }
    }

    /// Scheduled seconds between leaving this waypoint and reaching `next`.
    pub fn scheduled_to(&self, next: &Waypoint) -> Option<f64> {
        let leaves = self.departure.or(self.arrival)?;
        let reaches = next.arrival.or(next.departure)?;
        Some(reaches - leaves)
    }
}

/// Where a planned artificial connector starts or ends.
#[derive(Clone, Debug, PartialEq)]
pub enum Endpoint {
    Vertex(NodeIndex),
    /// The artificial vertex of a stop without candidates, which may not exist yet.
    Stop(StopId, Point),
}

impl Endpoint {
    fn position(&self, graph: &Graph) -> Point {
        match self {
            Endpoint::Vertex(ix) => graph.position(*ix),
            Endpoint::Stop(_, position) => *position,
        }
    }
}

/// An edge of a planned route path, resolved into the graph on materialisation.
#[derive(Clone, Debug, PartialEq)]
pub enum PlannedEdge {
    Existing(EdgeIndex),
    /// The artificial loop edge anchoring a stop without candidates.
    ArtificialStop { stop: StopId, position: Point },
    /// An artificial edge bridging two points no admissible path connects.
    Connector { from: Endpoint, to: Endpoint },
}

impl PlannedEdge {
    #[inline]
    pub fn is_artificial(&self) -> bool {
        !matches!(self, PlannedEdge::Existing(_))
    }
}

/// The outcome of planning one route.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutePlan {
    pub edges: Vec<PlannedEdge>,
    /// Index into `edges` of the anchor edge of each route stop.
    pub anchors: Vec<usize>,
    pub cost: Cost,
    pub fallbacks: Vec<Fallback>,
}

/// A node of a layer in the candidate graph.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerCandidate {
    Edge(Candidate),
    Artificial { stop: StopId, position: Point },
}

impl LayerCandidate {
    fn entry(&self, graph: &Graph) -> Endpoint {
        match self {
            LayerCandidate::Edge(candidate) => Endpoint::Vertex(graph.source(candidate.edge)),
            LayerCandidate::Artificial { stop, position } => {
                Endpoint::Stop(stop.clone(), *position)
            }
        }
    }

    fn exit(&self, graph: &Graph) -> Endpoint {
        match self {
            LayerCandidate::Edge(candidate) => Endpoint::Vertex(graph.target(candidate.edge)),
            LayerCandidate::Artificial { stop, position } => {
                Endpoint::Stop(stop.clone(), *position)
            }
        }
    }

    fn distance(&self) -> f64 {
        match self {
            LayerCandidate::Edge(candidate) => candidate.distance,
            LayerCandidate::Artificial { .. } => 0.0,
        }
    }

    fn planned(&self) -> PlannedEdge {
        match self {
            LayerCandidate::Edge(candidate) => PlannedEdge::Existing(candidate.edge),
            LayerCandidate::Artificial { stop, position } => PlannedEdge::ArtificialStop {
                stop: stop.clone(),
                position: *position,
            },
        }
    }

    fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (LayerCandidate::Edge(a), LayerCandidate::Edge(b)) => a.edge == b.edge,
            (
                LayerCandidate::Artificial { stop: a, .. },
                LayerCandidate::Artificial { stop: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

/// How two consecutive anchors are joined.
#[derive(Clone, Debug, PartialEq)]
enum Leg {
    /// Both stops share the anchor edge.
    Same,
    Path(Vec<EdgeIndex>),
    Artificial { from: Endpoint, to: Endpoint },
}

#[derive(Clone, Debug)]
struct Transition {
    cost: Cost,
    leg: Leg,
}

/// Chooses one anchor edge per stop of a route and the paths joining them.
///
/// Each stop contributes a layer of candidates. Transitions between two
/// consecutive layers are costed with one bounded search per distinct
/// source vertex, and the cheapest sequence through all layers is selected
/// by dynamic programming. Stops without candidates, and candidate pairs no
/// path joins within the bound, are bridged by artificial edges so that a
/// route is always planned completely.
pub struct PathBuilder<'a> {
    graph: &'a Graph,
    config: &'a MappingConfig,
}

impl<'a> PathBuilder<'a> {
    pub fn new(graph: &'a Graph, config: &'a MappingConfig) -> Self {
        Self { graph, config }
    }

    /// Builds a layer of candidates for every waypoint. A stop without any
    /// candidate is given a single artificial one.
    pub fn layers(
        &self,
        waypoints: &[Waypoint],
        filter: &ModeFilter,
    ) -> (Vec<Vec<LayerCandidate>>, Vec<Fallback>) {
        let finder = CandidateFinder::new(self.graph, self.config);

        let layers = waypoints
            .par_iter()
            .map(|waypoint| {
                let candidates = finder.find(waypoint.position, filter);
                if candidates.is_empty() {
                    vec![LayerCandidate::Artificial {
                        stop: waypoint.stop.clone(),
                        position: waypoint.position,
                    }]
                } else {
                    candidates.into_iter().map(LayerCandidate::Edge).collect()
                }
            })
            .collect::<Vec<_>>();

        let fallbacks = layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| matches!(layer.as_slice(), [LayerCandidate::Artificial { .. }]))
            .map(|(position, _)| Fallback {
                position,
                kind: FallbackKind::UnmappedStop,
            })
            .collect();

        (layers, fallbacks)
    }

    /// Plans the path of a route visiting `waypoints`, using edges the `filter` admits.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip_all))]
    pub fn plan(&self, waypoints: &[Waypoint], filter: &ModeFilter) -> RoutePlan {
        let (layers, mut fallbacks) = self.layers(waypoints, filter);
        let Some(first) = layers.first() else {
            return RoutePlan::default();
        };

        let transitions = (1..layers.len())
            .into_par_iter()
            .map(|i| {
                self.transitions(
                    (&layers[i - 1], &layers[i]),
                    (&waypoints[i - 1], &waypoints[i]),
                    filter,
                )
            })
            .collect::<Vec<_>>();

        // Cheapest cost of reaching each candidate, and the candidate it was reached from
        let mut best: Vec<Vec<(Cost, usize)>> = Vec::with_capacity(layers.len());
        best.push(
            first
                .iter()
                .map(|candidate| (self.arrival_cost(candidate), usize::MAX))
                .collect(),
        );

        for matrix in &transitions {
            let previous = best.last().map(Vec::as_slice).unwrap_or_default();
            let width = matrix.first().map_or(0, Vec::len);

            let layer = (0..width)
                .map(|to| {
                    previous
                        .iter()
                        .zip(matrix)
                        .enumerate()
                        .map(|(from, ((cost, _), row))| (cost.saturating_add(row[to].cost), from))
                        // Ties resolve to the better ranked candidate
                        .min_by_key(|(cost, _)| *cost)
                        .unwrap_or((Cost::MAX, usize::MAX))
                })
                .collect();

            best.push(layer);
        }

        let Some((mut chosen, cost)) = best.last().and_then(|last| {
            last.iter()
                .map(|(cost, _)| *cost)
                .enumerate()
                .min_by_key(|(_, cost)| *cost)
        }) else {
            return RoutePlan::default();
        };

        let mut choices = vec![chosen; layers.len()];
        for i in (1..layers.len()).rev() {
            chosen = best[i][chosen].1;
            choices[i - 1] = chosen;
        }

        let mut plan = RoutePlan {
            cost,
            ..RoutePlan::default()
        };

        plan.edges.push(first[choices[0]].planned());
        plan.anchors.push(0);

        for (i, matrix) in transitions.iter().enumerate() {
            let candidate = &layers[i + 1][choices[i + 1]];

            match &matrix[choices[i]][choices[i + 1]].leg {
                Leg::Same => {}
                Leg::Path(edges) => {
                    plan.edges.extend(edges.iter().copied().map(PlannedEdge::Existing));
                    plan.edges.push(candidate.planned());
                }
                Leg::Artificial { from, to } => {
                    fallbacks.push(Fallback {
                        position: i + 1,
                        kind: FallbackKind::Disconnected,
                    });

                    plan.edges.push(PlannedEdge::Connector {
                        from: from.clone(),
                        to: to.clone(),
                    });
                    plan.edges.push(candidate.planned());
                }
            }

            plan.anchors.push(plan.edges.len() - 1);
        }

        fallbacks.sort_by_key(|fallback| (fallback.position, fallback.kind));
        plan.fallbacks = fallbacks;

        debug!(
            "Planned {} stops onto {} edges (cost={cost})",
            waypoints.len(),
            plan.edges.len()
        );

        plan
    }

    /// The largest path cost accepted between two consecutive waypoints.
    pub fn bound(&self, from: &Waypoint, to: &Waypoint) -> Cost {
        let bound = to_cost(self.config.max_search_cost);

        match self.config.max_travel_cost_factor {
            Some(factor) => {
                // Candidates may lie anywhere within the radius ceiling of either stop
                let reach = Euclidean.distance(from.position, to.position)
                    + 2.0 * self.config.max_search_radius;

                let beeline = self
                    .config
                    .cost_model
                    .beeline_cost(reach, self.config.artificial_speed);

                bound.min((beeline as f64 * factor) as Cost)
            }
            None => bound,
        }
    }

    /// The cheapest admissible path from `from` to `to` within `bound`.
    pub fn shortest_path(
        &self,
        from: NodeIndex,
        to: NodeIndex,
        filter: &ModeFilter,
        bound: Cost,
    ) -> Option<(Vec<EdgeIndex>, Cost)> {
        let targets = FxHashSet::from_iter([to]);
        let reach = Dijkstra.bounded(
            self.graph,
            from,
            filter,
            self.config.cost_model,
            bound,
            &targets,
        );

        Some((reach.path(to)?, reach.cost(to)?))
    }

    /// The cost of selecting `candidate`, independent of how it is reached.
    fn arrival_cost(&self, candidate: &LayerCandidate) -> Cost {
        self.anchor_cost(candidate)
            .saturating_add(self.distance_penalty(candidate))
    }

    fn anchor_cost(&self, candidate: &LayerCandidate) -> Cost {
        match candidate {
            LayerCandidate::Edge(candidate) => self
                .config
                .cost_model
                .edge_cost(self.graph.edge_at(candidate.edge)),
            LayerCandidate::Artificial { .. } => 0,
        }
    }

    fn distance_penalty(&self, candidate: &LayerCandidate) -> Cost {
        to_cost(self.config.candidate_distance_weight * candidate.distance())
    }

    fn anchor_time(&self, candidate: &LayerCandidate) -> f64 {
        match candidate {
            LayerCandidate::Edge(candidate) => self.graph.edge_at(candidate.edge).travel_time(),
            LayerCandidate::Artificial { .. } => 0.0,
        }
    }

    fn transitions(
        &self,
        (from, to): (&[LayerCandidate], &[LayerCandidate]),
        (origin, destination): (&Waypoint, &Waypoint),
        filter: &ModeFilter,
    ) -> Vec<Vec<Transition>> {
        let bound = self.bound(origin, destination);
        let scheduled = origin.scheduled_to(destination);

        let targets = to
            .iter()
            .filter_map(|candidate| match candidate.entry(self.graph) {
                Endpoint::Vertex(ix) => Some(ix),
                Endpoint::Stop(..) => None,
            })
            .collect::<FxHashSet<_>>();

        let sources = from
            .iter()
            .filter_map(|candidate| match candidate.exit(self.graph) {
                Endpoint::Vertex(ix) => Some(ix),
                Endpoint::Stop(..) => None,
            })
            .unique()
            .collect::<Vec<_>>();

        let reaches = sources
            .into_par_iter()
            .map(|source| {
                let reach = Dijkstra.bounded(
                    self.graph,
                    source,
                    filter,
                    self.config.cost_model,
                    bound,
                    &targets,
                );

                (source, reach)
            })
            .collect::<FxHashMap<_, _>>();

        from.iter()
            .map(|a| {
                to.iter()
                    .map(|b| self.transition(a, b, &reaches, bound, scheduled))
                    .collect()
            })
            .collect()
    }

    fn transition(
        &self,
        from: &LayerCandidate,
        to: &LayerCandidate,
        reaches: &FxHashMap<NodeIndex, Reach>,
        bound: Cost,
        scheduled: Option<f64>,
    ) -> Transition {
        let penalty = self.distance_penalty(to);

        let (leg, cost, time) = if from.is_same(to) {
            (Leg::Same, 0, 0.0)
        } else {
            let exit = from.exit(self.graph);
            let entry = to.entry(self.graph);

            let path = match (&exit, &entry) {
                (Endpoint::Vertex(source), Endpoint::Vertex(target)) => reaches
                    .get(source)
                    .and_then(|reach| Some((reach.path(*target)?, reach.cost(*target)?))),
                _ => None,
            };

            let (leg, cost, time) = match path {
                Some((edges, cost)) => {
                    let time = edges
                        .iter()
                        .map(|ix| self.graph.edge_at(*ix).travel_time())
                        .sum::<f64>();

                    (Leg::Path(edges), cost, time)
                }
                None => {
                    let distance =
                        Euclidean.distance(exit.position(self.graph), entry.position(self.graph));
                    let speed = self.config.artificial_speed;
                    let cost = bound
                        .saturating_add(self.config.cost_model.beeline_cost(distance, speed));

                    (
                        Leg::Artificial {
                            from: exit,
                            to: entry,
                        },
                        cost,
                        distance / speed,
                    )
                }
            };

            let anchor = self.anchor_cost(to);
            (leg, cost.saturating_add(anchor), time + self.anchor_time(to))
        };

        let deviation = match scheduled {
            Some(scheduled) if self.config.schedule_deviation_weight > 0.0 => {
                to_cost(self.config.schedule_deviation_weight * (time - scheduled).abs())
            }
            _ => 0,
        };

        Transition {
            cost: cost.saturating_add(penalty).saturating_add(deviation),
            leg,
        }
    }
}
