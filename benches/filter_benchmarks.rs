//! Benchmarks for smoothing and gesture classification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dmx_head_tracker::{
    filters::{advance, PoseFilter, VelocityFilter},
    gesture::GestureDetector,
};

/// Noisy head motion in normalized units
fn test_data(len: usize) -> Vec<(f64, f64)> {
    (0..len)
        .map(|i| {
            let t = i as f64 * 0.1;
            let pan = 0.6 * t.sin() + 0.05 * rand::random::<f64>();
            let tilt = 0.4 * t.cos() + 0.05 * rand::random::<f64>();
            (pan, tilt)
        })
        .collect()
}

fn benchmark_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoothing");
    let data = test_data(100);

    group.bench_function("advance_single_axis", |b| {
        b.iter(|| black_box(advance(black_box(0.2), black_box(0.8), black_box(0.01), 0.85, 5.0 / 127.0)));
    });

    for smoothing in [0.5, 0.85, 0.95] {
        let mut filter = VelocityFilter::new(smoothing, 5.0 / 127.0);

        group.bench_with_input(BenchmarkId::new("single_update", smoothing), &data[0], |b, &(pan, tilt)| {
            b.iter(|| black_box(filter.apply(black_box(pan), black_box(tilt))));
        });

        group.bench_with_input(BenchmarkId::new("sequence_100", smoothing), &data, |b, data| {
            b.iter(|| {
                filter.reset();
                for &(pan, tilt) in data {
                    black_box(filter.apply(black_box(pan), black_box(tilt)));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_gestures(c: &mut Criterion) {
    let mut group = c.benchmark_group("gestures");

    // Full window, so every call pays for a classification
    let mut detector = GestureDetector::new();
    for &(pan, tilt) in &test_data(30) {
        detector.observe(pan, tilt);
    }
    group.bench_function("classify_full_window", |b| {
        b.iter(|| black_box(detector.classify()));
    });

    let data = test_data(300);
    group.bench_with_input(BenchmarkId::new("observe_sequence", data.len()), &data, |b, data| {
        b.iter(|| {
            let mut detector = GestureDetector::new();
            for &(pan, tilt) in data {
                black_box(detector.observe(black_box(pan), black_box(tilt)));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_smoothing, benchmark_gestures);
criterion_main!(benches);
