//! Performance benchmarks for sim_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sim_core::scenario::ScenarioParams;
use sim_core::simulation::Simulation;

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![("small", 50, 5), ("medium", 500, 25), ("large", 2000, 80)];

    let mut group = c.benchmark_group("simulation_run");
    for (name, trucks, stations) in scenarios {
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(trucks, stations),
            |b, &(trucks, stations)| {
                b.iter(|| {
                    let params = ScenarioParams::new(trucks, stations).with_seed(42);
                    let mut sim = Simulation::new(params).expect("valid scenario");
                    black_box(sim.run().expect("run completes"));
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_simulation_run);
criterion_main!(benches);
