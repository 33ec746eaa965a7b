//! # Integrator Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use nalgebra::Vector2;
use odom_lib::{loc::Pose, odom::integrate};

fn integrator_benchmark(c: &mut Criterion) {
    // ---- Build a starting pose ----

    let pose = Pose {
        position_m: Vector2::new(1.0, 2.0),
        heading_rad: 0.75,
        speed_ms: 0.0,
        turn_rate_rads: 0.0,
    };

    // Bench the straight branch
    c.bench_function("integrate::straight", |b| {
        b.iter(|| integrate(&pose, 0.05, 0.05, 0.25, 0.1))
    });

    // Bench the arc branch
    c.bench_function("integrate::arc", |b| {
        b.iter(|| integrate(&pose, 0.04, 0.06, 0.25, 0.1))
    });
}

criterion_group!(benches, integrator_benchmark);
criterion_main!(benches);
