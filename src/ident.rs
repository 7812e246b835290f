//! String-backed identifiers used across the network and the schedule.
//!
//! Every identifier orders lexically, which is what gives candidate ranking
//! and warning reports a reproducible order.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Identifies a [`Vertex`](crate::graph::Vertex) of the network.
    VertexId
);

identifier!(
    /// Identifies an [`Edge`](crate::graph::Edge) of the network.
    EdgeId
);

identifier!(
    /// A transport mode, such as `bus`, `tram` or `car`.
    ///
    /// Network edges carry a set of modes they permit, schedule routes
    /// carry the single mode they are operated with.
    Mode
);

identifier!(
    /// Identifies a [`Stop`](crate::schedule::Stop), parent or child.
    StopId
);

identifier!(
    /// Identifies a [`Line`](crate::schedule::Line).
    LineId
);

identifier!(
    /// Identifies a [`Route`](crate::schedule::Route) within its line.
    RouteId
);

identifier!(
    /// Identifies a [`ReferenceShape`](crate::schedule::ReferenceShape).
    ShapeId
);
