//! Criterion benchmarks for whole rounds on the reference profiles.

use amoebot_bench::{reference_profile, stress_profile, walking_line, PulseFactory, WalkFactory};
use amoebot_engine::ParticleSystem;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_round_1k(c: &mut Criterion) {
    let config = reference_profile(42).unwrap();
    let mut system = ParticleSystem::new(&config, &PulseFactory).unwrap();

    // Warm up: run one round so the first circuit build is done
    system.simulate_round().unwrap();

    c.bench_function("pulse_round_1k", |b| {
        b.iter(|| {
            let report = system.simulate_round().unwrap();
            black_box(&report);
        });
    });
}

fn bench_round_10k(c: &mut Criterion) {
    let config = stress_profile(42).unwrap();
    let mut system = ParticleSystem::new(&config, &PulseFactory).unwrap();

    system.simulate_round().unwrap();

    c.bench_function("pulse_round_10k", |b| {
        b.iter(|| {
            let report = system.simulate_round().unwrap();
            black_box(&report);
        });
    });
}

fn bench_walk_100_rounds(c: &mut Criterion) {
    let config = walking_line(1_000).unwrap();
    c.bench_function("walk_100_rounds_1k", |b| {
        b.iter(|| {
            let mut system = ParticleSystem::new(&config, &WalkFactory).unwrap();
            for _ in 0..100 {
                let report = system.simulate_round().unwrap();
                black_box(&report);
            }
        });
    });
}

fn bench_rewind(c: &mut Criterion) {
    let config = reference_profile(42).unwrap();
    let mut system = ParticleSystem::new(&config, &PulseFactory).unwrap();
    system.run(50).unwrap();

    c.bench_function("rewind_50_rounds_1k", |b| {
        b.iter(|| {
            system.set_marker_to_round(0).unwrap();
            system.set_marker_to_round(50).unwrap();
            black_box(system.current_round());
        });
    });
}

criterion_group!(
    benches,
    bench_round_1k,
    bench_round_10k,
    bench_walk_100_rounds,
    bench_rewind
);
criterion_main!(benches);
