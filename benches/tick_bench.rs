//! Performance benchmarks for the fusion tick path.
//!
//! Run with: cargo bench
//!
//! Benchmarks cover:
//! - Motion frame differencing at camera resolutions
//! - Depth region statistics over a person box
//! - The full fusion tick

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use triage_fusion::prelude::*;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Deterministic RGBA frame with a gradient pattern.
fn gradient_rgb(width: u32, height: u32, phase: u8) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let value = ((x + y) as u8).wrapping_add(phase);
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    pixels
}

/// Depth plane at 2 m with a sparse sprinkling of dropout pixels.
fn depth_plane(width: u32, height: u32) -> Vec<u16> {
    (0..width * height)
        .map(|i| if i % 97 == 0 { 0 } else { 2000 })
        .collect()
}

fn person_detection(frame_height: f32) -> Detection {
    Detection {
        x1: 220.0,
        y1: frame_height * 0.2,
        x2: 420.0,
        y2: frame_height * 0.9,
        confidence: 0.9,
        class_id: PERSON_CLASS_ID,
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_motion_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("motion_analysis");

    for (width, height) in [(320u32, 240u32), (640, 480)] {
        let frame_a = gradient_rgb(width, height, 0);
        let frame_b = gradient_rgb(width, height, 40);
        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &(frame_a, frame_b),
            |b, (frame_a, frame_b)| {
                let mut analyzer = MotionAnalyzer::with_defaults();
                let mut now = 0i64;
                b.iter(|| {
                    now += 33;
                    analyzer.analyze(black_box(frame_a), width as usize, height as usize, now);
                    now += 33;
                    analyzer.analyze(black_box(frame_b), width as usize, height as usize, now);
                });
            },
        );
    }

    group.finish();
}

fn bench_region_stats(c: &mut Criterion) {
    let mut frame = DepthFrame::new();
    let samples = depth_plane(640, 480);
    frame.update(&samples, 640, 480).expect("valid frame");
    let bbox = BoundingBox::new(0.3, 0.2, 0.35, 0.7);

    c.bench_function("region_stats_person_box", |b| {
        b.iter(|| frame.region_stats(black_box(&bbox)));
    });
}

fn bench_full_tick(c: &mut Criterion) {
    let rgb = gradient_rgb(640, 480, 0);
    let depth = depth_plane(640, 480);
    let detections = [person_detection(480.0)];

    c.bench_function("full_fusion_tick", |b| {
        let mut engine = FusionEngine::with_defaults();
        let mut now = 0i64;
        b.iter(|| {
            now += 33;
            let input = TickInput {
                rgb_pixels: &rgb,
                rgb_width: 640,
                rgb_height: 480,
                detections: &detections,
                depth: Some(DepthUpdate {
                    samples: &depth,
                    width: 640,
                    height: 480,
                }),
                upstream_fall_hint: false,
                timestamp_ms: now,
            };
            black_box(engine.process_tick(&input))
        });
    });
}

criterion_group!(
    benches,
    bench_motion_analysis,
    bench_region_stats,
    bench_full_tick
);
criterion_main!(benches);
