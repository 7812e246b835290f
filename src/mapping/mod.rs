//! Maps the routes of a schedule onto the network.
//!
//! For every stop of a route the [`CandidateFinder`] ranks the nearby edges
//! the route's mode may use, the [`PathBuilder`] selects one anchor edge per
//! stop and the shortest admissible paths between them, and the [`Mapper`]
//! writes the outcome back into the graph and the schedule.

mod candidate;
mod cost;
mod dijkstra;
mod mapper;
mod path;
mod report;


pub use candidate::{Candidate, CandidateFinder};
pub use cost::{Cost, CostModel, PRECISION, to_cost};
pub use dijkstra::{Dijkstra, DijkstraReachable, DijkstraReachableItem, Reach};
pub use mapper::Mapper;
pub use path::{Endpoint, LayerCandidate, PathBuilder, PlannedEdge, RoutePlan, Waypoint};
pub use report::{Fallback, FallbackKind, FallbackRecord, MappingReport};
