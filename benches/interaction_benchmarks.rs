//! Benchmarks for fingertip mapping and smoothing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use face_filter::{
    interaction::{to_canvas, CanvasSize, InteractionMapper, Region},
    landmarks::{Landmark, LandmarkSet},
    quiz::choice_regions,
    smoothing::create_filter,
};
use std::time::{Duration, Instant};

const CANVAS: CanvasSize = CanvasSize::new(1280.0, 720.0);

/// Fingertip sweeping across the frame, with a little jitter
fn sweep(frames: usize) -> Vec<LandmarkSet> {
    (0..frames)
        .map(|i| {
            let t = i as f32 / frames as f32;
            let jitter = ((i * 17) % 11) as f32 / 1100.0;
            LandmarkSet::new(vec![Landmark::new(t + jitter, 0.8 - jitter, 0.0); 21])
        })
        .collect()
}

fn benchmark_to_canvas(c: &mut Criterion) {
    c.bench_function("to_canvas_mirrored", |b| {
        b.iter(|| black_box(to_canvas(black_box(0.37), black_box(0.61), CANVAS, true)));
    });
}

fn benchmark_mapper(c: &mut Criterion) {
    let mut group = c.benchmark_group("interaction_mapper");
    let hands = sweep(300);
    let regions = choice_regions(CANVAS);

    for filter in ["none", "exponential:0.5", "moving_average:5"] {
        group.bench_with_input(BenchmarkId::new("sweep_300", filter), &hands, |b, hands| {
            b.iter(|| {
                let mut mapper = InteractionMapper::new(Duration::from_millis(2000), true)
                    .with_filter(create_filter(filter).unwrap());
                let start = Instant::now();
                let mut fired = 0;
                for (i, hand) in hands.iter().enumerate() {
                    let now = start + Duration::from_millis(i as u64 * 33);
                    if mapper.map(&[hand], &regions, CANVAS, now).is_some() {
                        fired += 1;
                    }
                }
                black_box(fired)
            });
        });
    }

    group.finish();
}

fn benchmark_many_regions(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_count");
    let hand = LandmarkSet::new(vec![Landmark::new(0.99, 0.99, 0.0); 21]);

    for count in [2usize, 16, 128] {
        let regions: Vec<(Region, usize)> = (0..count)
            .map(|i| (Region::new(i as f32 * 5.0, 0.0, 4.0, 4.0), i))
            .collect();
        let mut mapper = InteractionMapper::new(Duration::ZERO, false);
        group.bench_with_input(BenchmarkId::new("locate_miss", count), &regions, |b, regions| {
            b.iter(|| black_box(mapper.locate(&[&hand], regions, CANVAS)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_to_canvas, benchmark_mapper, benchmark_many_regions);
criterion_main!(benches);
