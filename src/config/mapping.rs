use crate::Mode;
use crate::config::{ConfigError, load};
use crate::graph::{DEFAULT_FREESPEED, ModeFilter};
use crate::mapping::CostModel;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Parameters of the [`Mapper`](crate::mapping::Mapper).
///
/// All distances are in meters, speeds in meters per second, and search
/// costs in the unit of the configured [`CostModel`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Initial radius of the candidate search around a stop.
    pub search_radius: f64,
    /// Amount the radius grows by while no candidate was found.
    pub search_radius_increment: f64,
    /// Hard ceiling of the candidate search radius.
    pub max_search_radius: f64,
    /// Number of candidates kept per stop, ties at the cut-off are kept too.
    pub max_candidates: usize,

    /// Upper bound of the cost of a path between two consecutive stops.
    pub max_search_cost: f64,
    /// When set, bounds the path cost between two consecutive stops to
    /// this multiple of their straight-line cost as well.
    pub max_travel_cost_factor: Option<f64>,
    pub cost_model: CostModel,

    /// Penalty per meter between a stop and its candidate edge.
    pub candidate_distance_weight: f64,
    /// Penalty per second of deviation between path and scheduled travel time.
    pub schedule_deviation_weight: f64,

    /// Freespeed assigned to artificial edges.
    pub artificial_speed: f64,

    /// Network modes each schedule mode may travel on, in addition to itself.
    pub mode_routing_assignment: BTreeMap<Mode, BTreeSet<Mode>>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            search_radius: 25.0,
            search_radius_increment: 25.0,
            max_search_radius: 150.0,
            max_candidates: 6,

            max_search_cost: 10_000.0,
            max_travel_cost_factor: None,
            cost_model: CostModel::default(),

            candidate_distance_weight: 0.0,
            schedule_deviation_weight: 0.0,

            artificial_speed: DEFAULT_FREESPEED,

            mode_routing_assignment: BTreeMap::new(),
        }
    }
}

impl MappingConfig {
    /// The network modes a route operated with `mode` may use.
    pub fn mode_filter(&self, mode: &Mode) -> ModeFilter {
        let assigned = self.mode_routing_assignment.get(mode).into_iter().flatten();
        ModeFilter::new(assigned.cloned().chain(std::iter::once(mode.clone())))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid(field, format!("{value} must be positive")))
            }
        };

        let non_negative = |field: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid(field, format!("{value} must not be negative")))
            }
        };

        positive("search_radius", self.search_radius)?;
        positive("search_radius_increment", self.search_radius_increment)?;
        positive("max_search_radius", self.max_search_radius)?;
        positive("max_search_cost", self.max_search_cost)?;
        positive("artificial_speed", self.artificial_speed)?;
        non_negative("candidate_distance_weight", self.candidate_distance_weight)?;
        non_negative("schedule_deviation_weight", self.schedule_deviation_weight)?;

        if self.max_search_radius < self.search_radius {
            return Err(ConfigError::invalid(
                "max_search_radius",
                format!(
                    "{} is below the initial radius of {}",
                    self.max_search_radius, self.search_radius
                ),
            ));
        }

        if self.max_candidates == 0 {
            return Err(ConfigError::invalid(
                "max_candidates",
                "at least one candidate is required",
            ));
        }

        if let Some(factor) = self.max_travel_cost_factor {
            if !factor.is_finite() || factor < 1.0 {
                return Err(ConfigError::invalid(
                    "max_travel_cost_factor",
                    format!("{factor} must be at least 1"),
                ));
            }
        }

        Ok(())
    }
}

impl TryFrom<&Path> for MappingConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let config: MappingConfig = load(path)?;
        config.validate()?;
        Ok(config)
    }
}
