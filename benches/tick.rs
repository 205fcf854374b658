//! Criterion benchmarks for marker-field construction and per-tick cost.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marker_crowd::engine::{CrowdConfig, CrowdMap};

/// Benchmark: build a 64x64 field at density 8 (32K markers).
fn bench_build_64x64(c: &mut Criterion) {
    let config = CrowdConfig::square(64).with_density(8).with_agent_count(64);

    c.bench_function("build_64x64_density8", |b| {
        b.iter(|| black_box(CrowdMap::new(&config).unwrap()));
    });
}

/// Benchmark: one tick with 256 agents over 32K markers.
fn bench_step_64x64(c: &mut Criterion) {
    let config = CrowdConfig::square(64).with_density(8).with_agent_count(256);
    let mut map = CrowdMap::new(&config).unwrap();

    c.bench_function("step_64x64_256_agents", |b| {
        b.iter(|| black_box(map.step(1.0 / 60.0)));
    });
}

criterion_group!(benches, bench_build_64x64, bench_step_64x64);
criterion_main!(benches);
