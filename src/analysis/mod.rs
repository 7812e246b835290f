//! Scores a mapping against independent reference shapes.
//!
//! For every route with a shape, the distance from each vertex of the mapped
//! path to the shape is measured, summarised as percentiles, and compared in
//! length. Across routes, the Q8585 summarises the whole schedule as the 85th
//! percentile of the routes' 85th percentile distances.

mod percentile;

#[cfg(test)]
mod test;

pub use percentile::percentile;

use crate::error::Result;
use crate::graph::Graph;
use crate::schedule::{LineId, ReferenceShape, Route, RouteId, Schedule, ShapeId};
use crate::spatial::{Projection, distance_to_linestring};

use geo::{Distance, Euclidean, LineString, Point};
use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::Level;

pub const DEFAULT_PERCENTILES: [u8; 6] = [0, 25, 50, 75, 85, 100];

/// The percentile summarised by the Q8585, at both levels.
const Q: u8 = 85;

#[derive(Clone, Debug, PartialEq)]
pub struct RouteAnalysis {
    pub shape: ShapeId,
    /// Distance from every vertex of the mapped path to the shape, in path order.
    pub distances: Vec<f64>,
    pub percentiles: BTreeMap<u8, f64>,
    /// Planar length of the mapped path over the length of the shape.
    pub length_ratio: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisReport {
    pub routes: BTreeMap<(LineId, RouteId), RouteAnalysis>,
    /// The 85th percentile of every route's 85th percentile distance.
    pub q8585: Option<f64>,
}

impl AnalysisReport {
    pub fn route(&self, line: &LineId, route: &RouteId) -> Option<&RouteAnalysis> {
        self.routes.get(&(line.clone(), route.clone()))
    }
}

#[derive(Clone, Debug)]
pub struct MappingAnalysis {
    percentiles: Vec<u8>,
}

impl Default for MappingAnalysis {
    fn default() -> Self {
        Self::new(DEFAULT_PERCENTILES)
    }
}

impl MappingAnalysis {
    /// Reports the given percentiles (0 to 100) for every route.
    pub fn new(percentiles: impl IntoIterator<Item = u8>) -> Self {
        let mut percentiles = percentiles
            .into_iter()
            .map(|p| p.min(100))
            .collect::<Vec<_>>();

        percentiles.sort_unstable();
        percentiles.dedup();
        Self { percentiles }
    }

    /// Analyses every mapped route a shape represents. Shapes are given in
    /// the coordinates `projection` converts into those of the graph.
    ///
    /// Routes without a shape, without a path, or whose shape has no length
    /// are left out of the report.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::INFO, skip_all))]
    pub fn run(
        &self,
        graph: &Graph,
        schedule: &Schedule,
        shapes: &[ReferenceShape],
        projection: &impl Projection,
    ) -> Result<AnalysisReport> {
        let routes = schedule.routes().collect::<Vec<_>>();

        let analysed = routes
            .par_iter()
            .filter(|(_, route)| !route.path.is_empty())
            .filter_map(|(line, route)| {
                let shape = shapes.iter().find(|shape| shape.represents(line, &route.id))?;
                Some((line, route, shape))
            })
            .map(|(line, route, shape)| {
                let analysis = self.route(graph, route, shape, projection)?;
                Ok(analysis.map(|analysis| (((*line).clone(), route.id.clone()), analysis)))
            })
            .collect::<Result<Vec<_>>>()?;

        let routes = analysed.into_iter().flatten().collect::<BTreeMap<_, _>>();

        let mut summary = routes
            .values()
            .filter_map(|analysis| percentile(&sorted(&analysis.distances), Q as f64))
            .collect::<Vec<_>>();
        summary.sort_by(f64::total_cmp);

        let q8585 = percentile(&summary, Q as f64);
        info!("Analysed {} routes, Q8585={q8585:?}", routes.len());

        Ok(AnalysisReport { routes, q8585 })
    }

    fn route(
        &self,
        graph: &Graph,
        route: &Route,
        shape: &ReferenceShape,
        projection: &impl Projection,
    ) -> Result<Option<RouteAnalysis>> {
        let path = graph.edge_ixs(&route.path)?;

        let projected = projection.project_line(&shape.geometry);
        let shape_length = length(&projected);
        if shape_length <= 0.0 {
            debug!("Shape {} has no length, skipping route {}", shape.id, route.id);
            return Ok(None);
        }

        let vertices = path
            .first()
            .map(|ix| graph.position(graph.source(*ix)))
            .into_iter()
            .chain(path.iter().map(|ix| graph.position(graph.target(*ix))));

        let distances = vertices
            .filter_map(|vertex: Point| distance_to_linestring(&projected, vertex))
            .collect::<Vec<_>>();

        let ordered = sorted(&distances);
        let percentiles = self
            .percentiles
            .iter()
            .filter_map(|p| Some((*p, percentile(&ordered, *p as f64)?)))
            .collect();

        let path_length = path
            .iter()
            .map(|ix| graph.geometric_length(*ix))
            .sum::<f64>();

        Ok(Some(RouteAnalysis {
            shape: shape.id.clone(),
            distances,
            percentiles,
            length_ratio: path_length / shape_length,
        }))
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

fn length(linestring: &LineString) -> f64 {
    linestring
        .lines()
        .map(|line| Euclidean.distance(line.start_point(), line.end_point()))
        .sum()
}
