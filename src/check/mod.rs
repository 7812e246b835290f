//! Post-mapping plausibility checks.
//!
//! The checks only read the graph and the schedule, re-running them on the
//! same input always yields the same report.

pub mod heading;
mod plausibility;
mod report;
mod warning;


pub use heading::Trip;
pub use plausibility::PlausibilityCheck;
pub use report::PlausibilityReport;
pub use warning::{PlausibilityWarning, WarningKind, WarningLocation};
