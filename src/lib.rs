#![doc = include_str!("../README.md")]

#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;
#[cfg_attr(feature = "mimalloc", global_allocator)]
#[cfg(feature = "mimalloc")]
static GLOBAL: MiMalloc = MiMalloc;

pub mod analysis;
pub mod check;
pub mod config;
pub mod error;
pub mod graph;
pub mod mapping;
pub mod schedule;
pub mod spatial;
pub mod util;

mod ident;

pub use error::{Error, Result};
pub use ident::{EdgeId, Mode, VertexId};

pub use analysis::{AnalysisReport, MappingAnalysis};
pub use check::{PlausibilityCheck, PlausibilityReport};
pub use config::{MappingConfig, PlausibilityConfig};
pub use graph::{Graph, Scan};
pub use mapping::{Mapper, MappingReport};
pub use schedule::Schedule;
