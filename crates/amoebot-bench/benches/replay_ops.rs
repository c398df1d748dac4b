//! Criterion benchmarks for hashing, saving and restoring runs.

use amoebot_bench::{reference_profile, PulseFactory};
use amoebot_circuit::MessageRegistry;
use amoebot_engine::ParticleSystem;
use amoebot_replay::{compare_runs, load_run, save_run, state_hash};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn pulse_run(rounds: u64) -> ParticleSystem {
    let config = reference_profile(42).unwrap();
    let mut system = ParticleSystem::new(&config, &PulseFactory).unwrap();
    system.run(rounds).unwrap();
    system
}

fn bench_state_hash(c: &mut Criterion) {
    let system = pulse_run(10);
    c.bench_function("state_hash_1k", |b| {
        b.iter(|| black_box(state_hash(&system)));
    });
}

fn bench_save(c: &mut Criterion) {
    let system = pulse_run(20);
    c.bench_function("save_20_rounds_1k", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            save_run(&system, &mut buf).unwrap();
            black_box(buf.len());
        });
    });
}

fn bench_load_and_restore(c: &mut Criterion) {
    let system = pulse_run(20);
    let mut buf = Vec::new();
    save_run(&system, &mut buf).unwrap();
    let registry = MessageRegistry::new();

    c.bench_function("restore_20_rounds_1k", |b| {
        b.iter(|| {
            let saved = load_run(buf.as_slice()).unwrap();
            let (restored, _) = saved.restore(&PulseFactory, &registry).unwrap();
            black_box(restored.current_round());
        });
    });
}

fn bench_compare(c: &mut Criterion) {
    let a = pulse_run(20);
    let b_run = pulse_run(20);
    c.bench_function("compare_runs_20_rounds_1k", |b| {
        b.iter(|| black_box(compare_runs(&a, &b_run)));
    });
}

criterion_group!(
    benches,
    bench_state_hash,
    bench_save,
    bench_load_and_restore,
    bench_compare
);
criterion_main!(benches);
