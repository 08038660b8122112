//! Benchmarks for the CPU-side frame work.
//!
//! The connection scan is quadratic in the particle count, which is the
//! only piece of per-frame work whose cost grows faster than linearly.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use plexus::{connections, Scene, Viewport, VisualConfig};

fn projected_scene(count: u32) -> Scene {
    let mut scene = Scene::new(
        count,
        7,
        VisualConfig::default(),
        Viewport::new(350.0, 350.0, 1.0),
    );
    // One tick so every particle has a projected position.
    scene.tick();
    scene
}

fn bench_connection_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("connection_scan");

    for count in [150, 300, 600] {
        let scene = projected_scene(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &scene, |b, scene| {
            b.iter(|| black_box(connections::collect(scene.particles(), 60.0)))
        });
    }

    group.finish();
}

fn bench_full_tick(c: &mut Criterion) {
    let mut scene = projected_scene(150);

    c.bench_function("tick_150", |b| b.iter(|| black_box(scene.tick())));
}

criterion_group!(benches, bench_connection_scan, bench_full_tick);
criterion_main!(benches);
