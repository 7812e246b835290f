//! The routable network the schedule is mapped onto.

mod filter;
mod item;
mod network;
mod scan;


pub use filter::ModeFilter;
pub use item::{DEFAULT_FREESPEED, Edge, Vertex};
pub use network::{ARTIFICIAL_PREFIX, Graph, GraphStructure};
pub use scan::Scan;

pub(crate) use item::IndexedEdge;
