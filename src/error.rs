use crate::config::ConfigError;
use crate::impl_err;
use crate::schedule::{LineId, RouteId, StopId};
use crate::{EdgeId, VertexId};

use thiserror::Error;

/// The crate-wide error.
///
/// Unreachable stops and disconnected stop pairs are never errors, the
/// mapping engine bridges those with artificial edges. Only broken
/// configuration and inconsistent input abort a pass.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(ConfigError),

    #[error("inconsistent input: {0}")]
    Inconsistent(IntegrityError),
}

impl_err!(ConfigError, Config);
impl_err!(IntegrityError, Inconsistent);

pub type Result<T> = std::result::Result<T, Error>;

/// Data-integrity violations found in the graph or schedule handed to the core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrityError {
    #[error("vertex {0} does not exist")]
    UnknownVertex(VertexId),

    #[error("edge {0} does not exist")]
    UnknownEdge(EdgeId),

    #[error("stop {0} does not exist")]
    UnknownStop(StopId),

    #[error("stop index {0} is out of range, it may predate a pruning pass")]
    StaleStop(usize),

    #[error("line {0} does not exist")]
    UnknownLine(LineId),

    #[error("route {1} does not exist on line {0}")]
    UnknownRoute(LineId, RouteId),

    #[error("vertex {0} was inserted twice")]
    DuplicateVertex(VertexId),

    #[error("edge {0} was inserted twice")]
    DuplicateEdge(EdgeId),

    #[error("stop {0} was inserted twice")]
    DuplicateStop(StopId),

    #[error("line {0} was inserted twice")]
    DuplicateLine(LineId),

    #[error("route {1} was inserted twice on line {0}")]
    DuplicateRoute(LineId, RouteId),

    #[error("route {1} on line {0} has no stop at position {2}")]
    PositionOutOfRange(LineId, RouteId, usize),

    #[error("route {1} on line {0} has an inconsistent path anchor at position {2}")]
    InvalidAnchor(LineId, RouteId, usize),

    #[error("route {1} on line {0} has not been mapped")]
    RouteNotMapped(LineId, RouteId),
}
