//! The timetable side of the mapping: stops, lines, routes and the
//! reference shapes used to score a mapping.

mod route;
mod shape;
mod stop;
mod store;

#[cfg(test)]
mod test;

pub use crate::ident::{LineId, RouteId, ShapeId, StopId};

pub use route::{Line, Route, RouteStop, as_seconds};
pub use shape::ReferenceShape;
pub use stop::{CHILD_SEPARATOR, Stop, StopIx};
pub use store::Schedule;
