#![allow(dead_code)]

use geo::Point;
use ptmap::graph::{Edge, Graph, Vertex};
use ptmap::schedule::{Line, Route, RouteStop, Schedule};
use ptmap::{EdgeId, Mode};

pub const BLOCK: f64 = 100.0;

/// Vertex identifier of the grid intersection at column `x`, row `y`.
pub fn node(x: usize, y: usize) -> String {
    format!("{x}_{y}")
}

/// Edge identifier of the grid street running from `from` to `to`.
pub fn street(from: (usize, usize), to: (usize, usize)) -> EdgeId {
    EdgeId::new(format!("{}>{}", node(from.0, from.1), node(to.0, to.1)))
}

/// A `width` by `height` grid of two-way streets, [`BLOCK`] meters apart,
/// open to the given modes.
pub fn grid(width: usize, height: usize, modes: &[&str]) -> Graph {
    let mut graph = Graph::new();

    for y in 0..height {
        for x in 0..width {
            graph
                .add_vertex(Vertex::new(
                    node(x, y),
                    Point::new(x as f64 * BLOCK, y as f64 * BLOCK),
                ))
                .expect("vertex");
        }
    }

    let mut link = |from: (usize, usize), to: (usize, usize)| {
        for (a, b) in [(from, to), (to, from)] {
            graph
                .add_edge(
                    Edge::new(street(a, b), node(a.0, a.1), node(b.0, b.1))
                        .with_modes(modes.iter().copied()),
                )
                .expect("edge");
        }
    };

    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                link((x, y), (x + 1, y));
            }
            if y + 1 < height {
                link((x, y), (x, y + 1));
            }
        }
    }

    graph
}

/// A schedule with a single route `l1/r1` serving a parent stop at each position.
pub fn schedule(mode: &str, stops: &[(&str, f64, f64)]) -> Schedule {
    let mut schedule = Schedule::new();
    let mut route = Route::new("r1", mode);

    for (id, x, y) in stops {
        if schedule.stop(&(*id).into()).is_none() {
            schedule
                .add_stop(*id, Point::new(*x, *y))
                .expect("stop");
        }

        route = route.with_stop(RouteStop::new(*id));
    }

    schedule
        .add_line(Line::new("l1").with_route(route).expect("route"))
        .expect("line");

    schedule
}

/// Asserts every edge of the path starts where the previous one ended.
pub fn assert_contiguous(graph: &Graph, path: &[EdgeId]) {
    for pair in path.windows(2) {
        let from = graph.edge(&pair[0]).expect("known edge");
        let to = graph.edge(&pair[1]).expect("known edge");
        assert_eq!(from.target, to.source, "{} does not lead onto {}", pair[0], pair[1]);
    }
}

pub fn bus() -> Mode {
    Mode::from("bus")
}
