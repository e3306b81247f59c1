//! Criterion benchmarks for the smelting job queue.
//!
//! Two benchmark groups:
//! - `busy_queue`: many working jobs, each advancing every tick
//! - `stalled_queue`: the same jobs with no fuel, measuring the stall path

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tiersmelter_core::station::Slot;
use tiersmelter_core::test_utils::*;

fn busy_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("busy_queue");
    for count in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            // Long tier and deep input so jobs never finish during measurement.
            let (mut smelter, mut world) = busy_setup(count, 3600.0, 64);
            b.iter(|| smelter.step(&mut world));
        });
    }
    group.finish();
}

fn stalled_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("stalled_queue");
    for count in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let (mut smelter, mut world) = busy_setup(count, 5.0, 64);
            for x in 0..count {
                world.set_slot(&station(x), Slot::Fuel, None);
            }
            b.iter(|| smelter.step(&mut world));
        });
    }
    group.finish();
}

criterion_group!(benches, busy_queue, stalled_queue);
criterion_main!(benches);
