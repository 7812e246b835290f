use crate::EdgeId;
use crate::config::MappingConfig;
use crate::graph::{Graph, ModeFilter, Scan};

use geo::Point;
use log::debug;
use petgraph::graph::EdgeIndex;
use std::cmp::Ordering;

#[cfg(feature = "tracing")]
use tracing::Level;

/// Distances closer than this are considered equal when truncating candidates.
const TIE_EPSILON: f64 = 1e-6;

/// An edge a stop could be anchored on.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub edge: EdgeIndex,
    pub id: EdgeId,

    /// Distance between the stop and its projection onto the edge.
    pub distance: f64,
    /// The projection of the stop onto the edge.
    pub position: Point,
}

impl Candidate {
    /// Orders candidates by distance, then by edge identifier.
    #[inline]
    pub fn rank(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Finds the edges a stop may be anchored on.
///
/// The search starts at the configured radius and widens by the configured
/// increment while nothing admissible was found, until the ceiling is reached.
pub struct CandidateFinder<'a> {
    graph: &'a Graph,
    config: &'a MappingConfig,
}

impl<'a> CandidateFinder<'a> {
    pub fn new(graph: &'a Graph, config: &'a MappingConfig) -> Self {
        Self { graph, config }
    }

    /// Returns the ranked candidates for a stop at `position`.
    /// An empty result means no admissible edge lies within the ceiling.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip(self, filter)))]
    pub fn find(&self, position: Point, filter: &ModeFilter) -> Vec<Candidate> {
        let mut radius = self.config.search_radius.min(self.config.max_search_radius);

        loop {
            let mut found = self
                .graph
                .scan_edges_projected(position, radius)
                .filter(|(ix, _, _)| filter.admits(self.graph.edge_at(*ix)))
                .map(|(edge, projected, distance)| Candidate {
                    edge,
                    id: self.graph.edge_at(edge).id.clone(),
                    distance,
                    position: projected,
                })
                .collect::<Vec<_>>();

            if !found.is_empty() {
                found.sort_by(Candidate::rank);
                return self.truncate(found);
            }

            if radius >= self.config.max_search_radius {
                debug!("No candidates within {radius}m of {position:?}");
                return found;
            }

            radius = (radius + self.config.search_radius_increment)
                .min(self.config.max_search_radius);
        }
    }

    /// Keeps the best `max_candidates`, and any candidate tied with the last one kept.
    fn truncate(&self, mut ranked: Vec<Candidate>) -> Vec<Candidate> {
        let limit = self.config.max_candidates.max(1);
        if ranked.len() <= limit {
            return ranked;
        }

        let cutoff = ranked[limit - 1].distance;
        let keep = limit
            + ranked[limit..]
                .iter()
                .take_while(|candidate| candidate.distance - cutoff <= TIE_EPSILON)
                .count();

        ranked.truncate(keep);
        ranked
    }
}
