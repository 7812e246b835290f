use crate::analysis::{MappingAnalysis, percentile};
use crate::graph::{Edge, Graph, Vertex};
use crate::schedule::{Line, ReferenceShape, Route, Schedule};
use crate::spatial::Planar;
use crate::EdgeId;

use approx::assert_relative_eq;
use geo::{Point, wkt};

#[test]
fn percentiles_interpolate() {
    let values = [0.0, 10.0, 20.0, 30.0];

    assert_relative_eq!(percentile(&values, 0.0).unwrap_or(f64::NAN), 0.0);
    assert_relative_eq!(percentile(&values, 100.0).unwrap_or(f64::NAN), 30.0);
    assert_relative_eq!(percentile(&values, 50.0).unwrap_or(f64::NAN), 15.0);
    assert_relative_eq!(percentile(&[7.0], 85.0).unwrap_or(f64::NAN), 7.0);
}

fn corner() -> Graph {
    let mut graph = Graph::new();
    for (id, x, y) in [("a", 0.0, 0.0), ("b", 100.0, 0.0), ("c", 100.0, 100.0)] {
        graph
            .add_vertex(Vertex::new(id, Point::new(x, y)))
            .expect("vertex");
    }

    for (from, to) in [("a", "b"), ("b", "c")] {
        graph
            .add_edge(Edge::new(format!("{from}{to}"), from, to).with_modes(["bus"]))
            .expect("edge");
    }

    graph
}

fn schedule_with(path: &[&str]) -> Schedule {
    let mut route = Route::new("r1", "bus");
    route.path = path.iter().map(|id| EdgeId::from(*id)).collect();

    let mut schedule = Schedule::new();
    schedule
        .add_line(Line::new("l1").with_route(route).expect("route"))
        .expect("line");
    schedule
}

#[test]
fn measures_vertices_against_shape() {
    let graph = corner();
    let schedule = schedule_with(&["ab", "bc"]);

    // The shape cuts the corner
    let shape = ReferenceShape::new("sh", wkt! { LINESTRING (0.0 0.0, 100.0 100.0) })
        .serving("l1", "r1");

    let report = MappingAnalysis::new([0, 50, 100])
        .run(&graph, &schedule, &[shape], &Planar)
        .expect("report");

    let analysis = report.route(&"l1".into(), &"r1".into()).expect("route");
    assert_eq!(analysis.distances.len(), 3);
    assert_relative_eq!(analysis.distances[1], 50.0 * 2f64.sqrt(), epsilon = 1e-9);
    assert_relative_eq!(analysis.percentiles[&0], 0.0);
    assert_relative_eq!(analysis.percentiles[&100], 50.0 * 2f64.sqrt(), epsilon = 1e-9);
    assert_relative_eq!(analysis.length_ratio, 200.0 / (100.0 * 2f64.sqrt()), epsilon = 1e-9);

    // A single route is its own summary
    let q8585 = report.q8585.expect("q8585");
    assert_relative_eq!(q8585, 0.7 * 50.0 * 2f64.sqrt(), epsilon = 1e-9);
}

#[test]
fn routes_without_shapes_are_excluded() {
    let graph = corner();
    let schedule = schedule_with(&["ab"]);

    let elsewhere = ReferenceShape::new("sh", wkt! { LINESTRING (0.0 0.0, 1.0 1.0) })
        .serving("l2", "r1");
    let degenerate = ReferenceShape::new("pt", wkt! { LINESTRING (5.0 5.0, 5.0 5.0) })
        .serving("l1", "r1");

    let report = MappingAnalysis::default()
        .run(&graph, &schedule, &[elsewhere, degenerate], &Planar)
        .expect("report");

    assert!(report.routes.is_empty());
    assert_eq!(report.q8585, None);

    let unmapped = schedule_with(&[]);
    let shape = ReferenceShape::new("sh", wkt! { LINESTRING (0.0 0.0, 1.0 1.0) })
        .serving("l1", "r1");
    let report = MappingAnalysis::default()
        .run(&graph, &unmapped, &[shape], &Planar)
        .expect("report");
    assert!(report.routes.is_empty());
}
