//! Benchmarks for the CPU side of a frame: orbit step, trail record and
//! snapshot assembly.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use cosmic_swirl::trail::{fade_alpha, Trail, MAX_TRAIL_LENGTH};
use cosmic_swirl::{Ring, Swirl, SwirlConfig, Time, Vec3};

/// A swirl whose trails are already full.
fn warmed_swirl(particles: u32) -> (Swirl, Time) {
    let config = SwirlConfig {
        rings: vec![Ring::new(0.4, particles, 0.005)],
        ..SwirlConfig::default()
    };
    let mut swirl = Swirl::new(&config, &mut StdRng::seed_from_u64(1)).unwrap();
    let mut time = Time::fixed(1.0 / 60.0);
    for _ in 0..MAX_TRAIL_LENGTH {
        time.update();
        swirl.frame(&time);
    }
    (swirl, time)
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    for particles in [10u32, 100, 500] {
        group.bench_with_input(BenchmarkId::new("step", particles), &particles, |b, &n| {
            let (mut swirl, mut time) = warmed_swirl(n);
            b.iter(|| {
                time.update();
                swirl.frame(black_box(&time));
            })
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for particles in [10u32, 100] {
        group.bench_with_input(BenchmarkId::new("full_trails", particles), &particles, |b, &n| {
            let (swirl, _) = warmed_swirl(n);
            b.iter(|| black_box(swirl.snapshot()))
        });
    }

    group.finish();
}

fn bench_trail(c: &mut Criterion) {
    let mut group = c.benchmark_group("trail");

    group.bench_function("record_full", |b| {
        let mut trail = Trail::new();
        for i in 0..MAX_TRAIL_LENGTH {
            trail.record(Vec3::splat(i as f32));
        }
        b.iter(|| trail.record(black_box(Vec3::ONE)))
    });

    group.bench_function("fade_alpha", |b| {
        b.iter(|| {
            (0..MAX_TRAIL_LENGTH)
                .map(|i| fade_alpha(black_box(i), MAX_TRAIL_LENGTH))
                .sum::<f32>()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_frame, bench_snapshot, bench_trail);
criterion_main!(benches);
