use criterion::{BatchSize, criterion_main};
use geo::Point;
use ptmap::check::PlausibilityCheck;
use ptmap::config::{MappingConfig, PlausibilityConfig};
use ptmap::graph::{Edge, Graph, Vertex};
use ptmap::mapping::Mapper;
use ptmap::schedule::{Line, Route, RouteStop, Schedule};

const SIDE: usize = 30;
const BLOCK: f64 = 100.0;

struct GridScenario {
    name: &'static str,
    routes: usize,
    stops: usize,
}

const GRID_CASES: [GridScenario; 2] = [
    GridScenario {
        name: "FEW_LONG",
        routes: 4,
        stops: 25,
    },
    GridScenario {
        name: "MANY_SHORT",
        routes: 40,
        stops: 6,
    },
];

fn grid() -> Graph {
    let mut graph = Graph::new();
    let id = |x: usize, y: usize| format!("{x}_{y}");

    for y in 0..SIDE {
        for x in 0..SIDE {
            graph
                .add_vertex(Vertex::new(
                    id(x, y),
                    Point::new(x as f64 * BLOCK, y as f64 * BLOCK),
                ))
                .expect("Vertex must be unique");
        }
    }

    for y in 0..SIDE {
        for x in 0..SIDE {
            let neighbours = [(x + 1, y), (x, y + 1)];
            for (nx, ny) in neighbours.into_iter().filter(|(nx, ny)| *nx < SIDE && *ny < SIDE) {
                for (a, b) in [(id(x, y), id(nx, ny)), (id(nx, ny), id(x, y))] {
                    graph
                        .add_edge(Edge::new(format!("{a}>{b}"), a, b).with_modes(["bus"]))
                        .expect("Edge must be unique");
                }
            }
        }
    }

    graph
}

/// Routes zig-zagging diagonally across the grid, each stop just off a street.
fn schedule(scenario: &GridScenario) -> Schedule {
    let mut schedule = Schedule::new();
    let mut line = Line::new("grid");

    for route in 0..scenario.routes {
        let mut stops = Vec::with_capacity(scenario.stops);

        for stop in 0..scenario.stops {
            let x = ((route * 3 + stop * 2) % (SIDE - 1)) as f64 * BLOCK + BLOCK / 2.0;
            let y = ((route + stop) % (SIDE - 1)) as f64 * BLOCK + 4.0;
            let id = format!("r{route}s{stop}");

            schedule
                .add_stop(id.as_str(), Point::new(x, y))
                .expect("Stop must be unique");
            stops.push(RouteStop::new(id).at(stop as i64 * 60, stop as i64 * 60 + 20));
        }

        line.add_route(Route::new(format!("r{route}"), "bus").with_stops(stops))
            .expect("Route must be unique");
    }

    schedule.add_line(line).expect("Line must be unique");
    schedule
}

fn target_benchmark(c: &mut criterion::Criterion) {
    #[cfg(feature = "tracing")]
    ptmap::util::trace::initialize_tracer();

    let mut group = c.benchmark_group("map");
    group.significance_level(0.1).sample_size(30);

    let mapper = Mapper::new(MappingConfig::default()).expect("Config must be valid");
    let check = PlausibilityCheck::new(&PlausibilityConfig::default().with_threshold("bus", 95.0))
        .expect("Config must be valid");

    GRID_CASES.iter().for_each(|sc| {
        group.bench_function(format!("map: {}", sc.name), |b| {
            b.iter_batched(
                || (grid(), schedule(sc)),
                |(mut graph, mut schedule)| {
                    mapper
                        .map(&mut graph, &mut schedule)
                        .expect("Mapping must complete successfully")
                },
                BatchSize::LargeInput,
            )
        });

        let mut graph = grid();
        let mut schedule = schedule(sc);
        mapper
            .map(&mut graph, &mut schedule)
            .expect("Mapping must complete successfully");

        group.bench_function(format!("check: {}", sc.name), |b| {
            b.iter(|| {
                check
                    .run(&graph, &schedule)
                    .expect("Check must complete successfully")
            })
        });
    });

    group.finish();
}

criterion::criterion_group!(targeted_benches, target_benchmark);
criterion_main!(targeted_benches);
