use crate::Mode;
use crate::config::{ConfigError, load};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Accepted deviation of the mapped travel time from the schedule, in seconds.
///
/// A stop pair is flagged when its mapped time is below `scheduled - below`
/// or above `scheduled + above`. Zero tolerances flag any deviation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceRange {
    pub below: f64,
    pub above: f64,
}

impl ToleranceRange {
    pub fn new(below: f64, above: f64) -> Self {
        Self { below, above }
    }

    #[inline]
    pub fn admits(&self, scheduled: f64, actual: f64) -> bool {
        actual >= scheduled - self.below && actual <= scheduled + self.above
    }
}

/// Parameters of the [`PlausibilityCheck`](crate::check::PlausibilityCheck).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlausibilityConfig {
    /// Largest accepted turn between consecutive edges, per mode, in degrees.
    pub direction_change_threshold: BTreeMap<Mode, f64>,
    pub travel_time_tolerance: ToleranceRange,
    /// Number of edges within which revisiting a vertex counts as a loop.
    pub loop_window: usize,
}

impl Default for PlausibilityConfig {
    fn default() -> Self {
        Self {
            direction_change_threshold: BTreeMap::new(),
            travel_time_tolerance: ToleranceRange::default(),
            loop_window: 8,
        }
    }
}

impl PlausibilityConfig {
    pub fn with_threshold(mut self, mode: impl Into<Mode>, degrees: f64) -> Self {
        self.direction_change_threshold.insert(mode.into(), degrees);
        self
    }

    pub fn with_tolerance(self, below: f64, above: f64) -> Self {
        Self {
            travel_time_tolerance: ToleranceRange::new(below, above),
            ..self
        }
    }

    pub fn threshold(&self, mode: &Mode) -> Result<f64, ConfigError> {
        self.direction_change_threshold
            .get(mode)
            .copied()
            .ok_or_else(|| ConfigError::MissingThreshold(mode.clone()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (mode, threshold) in &self.direction_change_threshold {
            if !(*threshold > 0.0 && *threshold <= 180.0) {
                return Err(ConfigError::invalid(
                    "direction_change_threshold",
                    format!("{threshold} for {mode} is outside (0, 180]"),
                ));
            }
        }

        let ToleranceRange { below, above } = self.travel_time_tolerance;
        if !(below.is_finite() && below >= 0.0 && above.is_finite() && above >= 0.0) {
            return Err(ConfigError::invalid(
                "travel_time_tolerance",
                format!("[{below}, {above}] must not be negative"),
            ));
        }

        if self.loop_window < 2 {
            return Err(ConfigError::invalid("loop_window", "must span at least two edges"));
        }

        Ok(())
    }
}

impl TryFrom<&Path> for PlausibilityConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let config: PlausibilityConfig = load(path)?;
        config.validate()?;
        Ok(config)
    }
}
