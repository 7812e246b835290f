mod common;

use common::{grid, schedule};
use geo::Point;
use ptmap::check::{PlausibilityCheck, PlausibilityWarning, WarningKind};
use ptmap::config::{ConfigError, MappingConfig, PlausibilityConfig};
use ptmap::graph::{Edge, Graph, Vertex};
use ptmap::mapping::Mapper;
use ptmap::schedule::{Line, Route, RouteStop, Schedule};
use ptmap::{EdgeId, Error, Mode};
use ptmap_fixtures::{PLAUSIBILITY_INCOMPLETE_TOML, PLAUSIBILITY_TOML, fixture_path};

/// A two-way street `a - b - c`, 100m per block.
fn street() -> Graph {
    let mut graph = Graph::new();

    for (id, x) in [("a", 0.0), ("b", 100.0), ("c", 200.0)] {
        graph
            .add_vertex(Vertex::new(id, Point::new(x, 0.0)))
            .expect("vertex");
    }

    for (from, to) in [("a", "b"), ("b", "c"), ("c", "b"), ("b", "a")] {
        graph
            .add_edge(Edge::new(format!("{from}{to}"), from, to).with_modes(["bus"]))
            .expect("edge");
    }

    graph
}

/// Out to `s2` and back to where the trip started, mapped onto [`street`].
fn there_and_back() -> (Graph, Schedule) {
    let mut graph = street();
    let mut schedule = Schedule::new();

    schedule.add_stop("s1", Point::new(50.0, 5.0)).expect("stop");
    schedule.add_stop("s2", Point::new(150.0, 5.0)).expect("stop");

    let route = Route::new("r1", "bus").with_stops([
        RouteStop::new("s1").at(0, 0),
        RouteStop::new("s2").at(60, 60),
        RouteStop::new("s1").at(75, 75),
    ]);

    schedule
        .add_line(Line::new("l1").with_route(route).expect("route"))
        .expect("line");

    Mapper::new(MappingConfig::default())
        .expect("valid config")
        .map(&mut graph, &mut schedule)
        .expect("mapped");

    (graph, schedule)
}

fn fixture() -> PlausibilityConfig {
    PlausibilityConfig::try_from(fixture_path(PLAUSIBILITY_TOML).as_path()).expect("fixture")
}

#[test_log::test]
fn reversal_is_a_loop_and_a_direction_change() {
    let (graph, schedule) = there_and_back();

    let path = &schedule.route(&"l1".into(), &"r1".into()).expect("route").path;
    assert_eq!(path, &["ab", "bc", "cb", "ba"].map(EdgeId::from).to_vec());

    let report = PlausibilityCheck::new(&fixture())
        .expect("valid config")
        .run(&graph, &schedule)
        .expect("checked");

    assert_eq!(report.count(WarningKind::DirectionChange), 1);
    assert_eq!(report.count(WarningKind::Loop), 1);
    assert_eq!(report.count(WarningKind::ArtificialLink), 0);

    match &report.warnings(WarningKind::DirectionChange)[0] {
        PlausibilityWarning::DirectionChange {
            location,
            from,
            to,
            angle,
            threshold,
        } => {
            assert_eq!(location.path_position, 2);
            assert_eq!(from, &EdgeId::from("bc"));
            assert_eq!(to, &EdgeId::from("cb"));
            approx::assert_relative_eq!(*angle, 180.0, epsilon = 1e-9);
            approx::assert_relative_eq!(*threshold, 95.0);
        }
        other => panic!("expected a direction change, got {other:?}"),
    }

    match &report.warnings(WarningKind::Loop)[0] {
        PlausibilityWarning::Loop { location, edges } => {
            assert_eq!(location.path_position, 1);
            assert_eq!(edges, &["bc", "cb"].map(EdgeId::from).to_vec());
        }
        other => panic!("expected a loop, got {other:?}"),
    }
}

#[test_log::test]
fn travel_time_outside_tolerance_is_flagged() {
    let (graph, schedule) = there_and_back();

    let report = PlausibilityCheck::new(&fixture())
        .expect("valid config")
        .run(&graph, &schedule)
        .expect("checked");

    // 7.2s of driving against 60s scheduled, the return leg is within tolerance
    let flagged = report.warnings(WarningKind::TravelTime);
    assert_eq!(flagged.len(), 1);

    let PlausibilityWarning::TravelTime {
        location,
        scheduled,
        actual,
        ..
    } = &flagged[0]
    else {
        panic!("expected a travel time warning");
    };

    assert_eq!(location.stop_position, Some(1));
    approx::assert_relative_eq!(*scheduled, 60.0);
    approx::assert_relative_eq!(*actual, 7.2, epsilon = 1e-6);
}

#[test_log::test]
fn lowering_the_threshold_never_removes_warnings() {
    let (graph, schedule) = there_and_back();

    let count = |degrees: f64| {
        let config = PlausibilityConfig::default().with_threshold("bus", degrees);
        PlausibilityCheck::new(&config)
            .expect("valid config")
            .run(&graph, &schedule)
            .expect("checked")
            .count(WarningKind::DirectionChange)
    };

    assert_eq!(count(180.0), 0);
    assert_eq!(count(90.0), 1);
    assert!(count(10.0) >= count(90.0));
}

#[test_log::test]
fn straight_route_is_plausible() {
    let mut graph = grid(4, 1, &["bus"]);
    let mut schedule = schedule("bus", &[("s1", 50.0, 5.0), ("s2", 250.0, 5.0)]);

    Mapper::new(MappingConfig::default())
        .expect("valid config")
        .map(&mut graph, &mut schedule)
        .expect("mapped");

    let report = PlausibilityCheck::new(&fixture())
        .expect("valid config")
        .run(&graph, &schedule)
        .expect("checked");

    assert!(report.is_empty(), "unexpected warnings: {report:?}");
}

#[test_log::test]
fn missing_threshold_refuses_to_run() {
    let config = PlausibilityConfig::try_from(fixture_path(PLAUSIBILITY_INCOMPLETE_TOML).as_path())
        .expect("fixture");

    let (graph, schedule) = there_and_back();
    let result = PlausibilityCheck::new(&config)
        .expect("valid config")
        .run(&graph, &schedule);

    match result {
        Err(Error::Config(ConfigError::MissingThreshold(mode))) => {
            assert_eq!(mode, Mode::from("bus"))
        }
        other => panic!("expected a missing threshold, got {other:?}"),
    }
}
