use crate::error::{Error, IntegrityError};
use crate::schedule::{Line, ReferenceShape, Route, RouteStop, Schedule, StopId};

use chrono::TimeDelta;
use geo::{Point, wkt};

fn schedule() -> Schedule {
    let mut schedule = Schedule::new();
    schedule.add_stop("s1", Point::new(0.0, 0.0)).expect("s1");
    schedule.add_stop("s2", Point::new(100.0, 0.0)).expect("s2");

    let route = Route::new("r1", "bus")
        .with_stop(RouteStop::new("s1").at(0, 30))
        .with_stop(RouteStop::new("s2").with_arrival(TimeDelta::seconds(90)));

    schedule
        .add_line(Line::new("l1").with_route(route).expect("route"))
        .expect("line");

    schedule
}

#[test]
fn children_are_keyed_by_parent_and_anchor() {
    let mut schedule = schedule();
    let s1 = schedule.stop_ix(&"s1".into()).expect("s1");

    let (child, created) = schedule.child_stop(s1, &"ab".into()).expect("child");
    assert!(created);
    assert_eq!(schedule.stop_at(child).map(|stop| &stop.id), Some(&StopId::from("s1.link:ab")));
    assert_eq!(schedule.parent_of(child), Some(s1));

    // Asking through the child resolves to the same parent
    let (again, created) = schedule.child_stop(child, &"ab".into()).expect("child");
    assert!(!created);
    assert_eq!(again, child);

    let (other, created) = schedule.child_stop(child, &"ba".into()).expect("child");
    assert!(created);
    assert_eq!(schedule.parent_of(other), Some(s1));
    assert_eq!(schedule.children_of(s1).count(), 2);
}

#[test]
fn rejects_duplicates() {
    let mut schedule = schedule();

    assert!(matches!(
        schedule.add_stop("s1", Point::new(1.0, 1.0)),
        Err(Error::Inconsistent(IntegrityError::DuplicateStop(_)))
    ));

    assert!(matches!(
        schedule.add_line(Line::new("l1")),
        Err(Error::Inconsistent(IntegrityError::DuplicateLine(_)))
    ));

    let line = Line::new("l2").with_route(Route::new("r1", "bus")).expect("route");
    assert!(line.with_route(Route::new("r1", "tram")).is_err());

    schedule.add_child_stop(&"s2".into(), "bc").expect("child");
    assert!(schedule.add_child_stop(&"s2".into(), "bc").is_err());
}

#[test]
fn route_lookup_reports_missing_parts() {
    let schedule = schedule();

    assert!(schedule.route(&"l1".into(), &"r1".into()).is_ok());
    assert!(matches!(
        schedule.route(&"l9".into(), &"r1".into()),
        Err(Error::Inconsistent(IntegrityError::UnknownLine(_)))
    ));
    assert!(matches!(
        schedule.route(&"l1".into(), &"r9".into()),
        Err(Error::Inconsistent(IntegrityError::UnknownRoute(_, _)))
    ));
}

#[test]
fn offsets_fall_back_to_each_other() {
    let schedule = schedule();
    let route = schedule.route(&"l1".into(), &"r1".into()).expect("route");

    assert_eq!(route.stops[0].leaves(), Some(TimeDelta::seconds(30)));
    assert_eq!(route.stops[1].leaves(), Some(TimeDelta::seconds(90)));
    assert_eq!(route.stops[1].reaches(), Some(TimeDelta::seconds(90)));
    assert!(!route.is_mapped());
}

#[test]
fn pruning_keeps_referenced_children() {
    let mut schedule = schedule();
    let s1 = schedule.stop_ix(&"s1".into()).expect("s1");
    let s2 = schedule.stop_ix(&"s2".into()).expect("s2");

    schedule.child_stop(s1, &"ab".into()).expect("unused");
    let (stale, _) = schedule.child_stop(s2, &"bc".into()).expect("used");
    let used = schedule.stop_at(stale).expect("used").id.clone();

    let route = schedule
        .route_mut(&"l1".into(), &"r1".into())
        .expect("route");
    route.stops[1].stop = used.clone();

    assert_eq!(schedule.prune_unused_children(), 1);
    assert_eq!(schedule.stop_count(), 3);
    assert!(schedule.stop(&"s1.link:ab".into()).is_none());

    // Indices were compacted, the surviving child still resolves to its parent
    let child = schedule.stop_ix(&used).expect("child");
    let parent = schedule.parent_of(child).expect("parent");
    assert_eq!(schedule.stop_at(parent).expect("s2").id, StopId::from("s2"));

    let (again, created) = schedule.child_stop(parent, &"bc".into()).expect("child");
    assert!(!created);
    assert_eq!(again, child);
}

#[test]
fn indices_from_before_pruning_do_not_resolve() {
    let mut schedule = schedule();
    let s1 = schedule.stop_ix(&"s1".into()).expect("s1");

    let (stale, _) = schedule.child_stop(s1, &"ab".into()).expect("child");
    assert!(schedule.stop_at(stale).is_some());

    assert_eq!(schedule.prune_unused_children(), 1);
    assert!(schedule.stop_at(stale).is_none());
    assert!(schedule.parent_of(stale).is_none());
    assert!(matches!(
        schedule.child_stop(stale, &"ab".into()),
        Err(Error::Inconsistent(IntegrityError::StaleStop(_)))
    ));
}

#[test]
fn shapes_name_their_routes() {
    let shape = ReferenceShape::new("sh1", wkt! { LINESTRING (0.0 0.0, 1.0 1.0) })
        .serving("l1", "r1")
        .serving("l1", "r2");

    assert!(shape.represents(&"l1".into(), &"r2".into()));
    assert!(!shape.represents(&"l2".into(), &"r1".into()));
}
