//! Benchmarks for the renderer crate - layout, rasterization and frames.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks
//! Or: cargo bench --package renderer -- raster

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use marker_common::{CacheConfig, MarkerConfig, MarkerSpec};
use renderer::{png, MarkerBuilder, SvgIconRenderer, Typeface};
use test_utils::{create_marker_like_pixels, fixtures::specs};

/// Builder with caching off so every iteration does the full work.
fn uncached_builder() -> MarkerBuilder {
    let config = MarkerConfig {
        cache: CacheConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    MarkerBuilder::new(
        &config,
        2.0,
        Arc::new(Typeface::estimated()),
        Box::new(SvgIconRenderer::default()),
    )
}

fn bench_layout(c: &mut Criterion) {
    let builder = uncached_builder();
    let mut group = c.benchmark_group("layout");

    for (name, spec) in [
        ("short", specs::short_label()),
        ("price_counter", specs::price_with_counter()),
        ("full", specs::full()),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &spec, |b, spec| {
            b.iter(|| black_box(builder.layout(black_box(spec))))
        });
    }

    group.finish();
}

fn bench_raster(c: &mut Criterion) {
    let mut builder = uncached_builder();
    let mut group = c.benchmark_group("raster");

    for (name, spec) in [
        ("short", specs::short_label()),
        ("pointer", specs::price_with_pointer()),
        ("full", specs::full()),
    ] {
        let pixels = builder.build(&spec).map(|i| i.area()).unwrap_or(0);
        group.throughput(Throughput::Elements(pixels));
        group.bench_with_input(BenchmarkId::from_parameter(name), &spec, |b, spec| {
            b.iter(|| black_box(builder.build(black_box(spec))))
        });
    }

    group.finish();
}

fn bench_transition_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("transition_frames");
    let start = specs::short_label();
    let end = MarkerSpec::new("R$ 12.500.000").with_counter("9").with_pointer(true);

    for frame_count in [10usize, 20, 40] {
        let steps: Vec<f32> = (1..=frame_count)
            .map(|i| i as f32 / frame_count as f32)
            .collect();
        group.throughput(Throughput::Elements(frame_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(frame_count),
            &steps,
            |b, steps| {
                let mut builder = uncached_builder();
                b.iter(|| black_box(builder.build_transition_frames(&start, &end, steps)))
            },
        );
    }

    group.finish();
}

fn bench_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encode");

    for (w, h) in [(80usize, 72usize), (256, 128)] {
        let pixels = create_marker_like_pixels(w, h);
        group.throughput(Throughput::Bytes(pixels.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("auto", format!("{}x{}", w, h)),
            &pixels,
            |b, pixels| b.iter(|| black_box(png::create_png_auto(pixels, w, h))),
        );
        group.bench_with_input(
            BenchmarkId::new("rgba", format!("{}x{}", w, h)),
            &pixels,
            |b, pixels| b.iter(|| black_box(png::create_png_rgba(pixels, w, h))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_layout,
    bench_raster,
    bench_transition_frames,
    bench_png
);
criterion_main!(benches);
