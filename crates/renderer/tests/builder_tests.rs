//! Tests for cached marker building and image export.

use std::sync::Arc;

use marker_common::{CacheConfig, MarkerConfig};
use renderer::{MarkerBuilder, SvgIconRenderer, Typeface};
use test_utils::{fixtures::specs, temp_test_dir};

fn builder_with(config: MarkerConfig) -> MarkerBuilder {
    MarkerBuilder::new(
        &config,
        1.0,
        Arc::new(Typeface::estimated()),
        Box::new(SvgIconRenderer::default()),
    )
}

fn builder() -> MarkerBuilder {
    builder_with(MarkerConfig::default())
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_build_is_cached() {
    let mut b = builder();
    let first = b.build(&specs::price()).unwrap();
    let second = b.build(&specs::price()).unwrap();

    assert_eq!(first, second);
    assert_eq!(b.cache().len(), 1);
    assert_eq!(b.cache().stats().hits, 1);
    assert_eq!(b.cache().stats().misses, 1);
}

#[test]
fn test_distinct_specs_distinct_entries() {
    let mut b = builder();
    b.build(&specs::price()).unwrap();
    b.build(&specs::price().selected(true)).unwrap();
    b.build(&specs::price().with_counter("")).unwrap();
    // An empty counter differs structurally even though it renders the same.
    assert_eq!(b.cache().len(), 3);
}

#[test]
fn test_disabled_cache_retains_nothing() {
    let config = MarkerConfig {
        cache: CacheConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut b = builder_with(config);
    let first = b.build(&specs::price()).unwrap();
    let second = b.build(&specs::price()).unwrap();
    assert_eq!(first, second);
    assert!(b.cache().is_empty());
    assert_eq!(b.cache().stats().hits, 0);
}

#[test]
fn test_disabling_at_runtime_clears() {
    let mut b = builder();
    b.build(&specs::price()).unwrap();
    b.set_cache_enabled(false);
    assert!(b.cache().is_empty());
}

// ============================================================================
// Transition frames
// ============================================================================

#[test]
fn test_frame_endpoints_match_steady_builds() {
    let mut b = builder();
    let start = specs::one_char();
    let end = specs::five_chars();

    let first = b.build_transition_frame(&start, &end, 0.0).unwrap();
    let last = b.build_transition_frame(&start, &end, 1.0).unwrap();
    assert_eq!(first, b.build(&start).unwrap());
    assert_eq!(last, b.build(&end).unwrap());
}

#[test]
fn test_frames_grow_between_endpoints() {
    let mut b = builder();
    let steps = [0.25, 0.5, 0.75, 1.0];
    let frames = b
        .build_transition_frames(&specs::short_label(), &specs::price(), &steps)
        .unwrap();
    assert_eq!(frames.len(), 4);
    for pair in frames.windows(2) {
        assert!(pair[0].area() <= pair[1].area());
    }
    assert_eq!(b.cache().len(), 4);

    // Rebuilding hits the cache for every step.
    b.build_transition_frames(&specs::short_label(), &specs::price(), &steps)
        .unwrap();
    assert_eq!(b.cache().stats().hits, 4);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_png_export() {
    let mut b = builder();
    let image = b.build(&specs::full()).unwrap();
    let png = image.encode_png().unwrap();
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (image.width(), image.height()));
    assert_eq!(decoded.into_raw(), image.to_rgba_bytes());
}

#[test]
fn test_write_png_file() {
    let dir = temp_test_dir();
    let path = dir.path().join("marker.png");
    let mut b = builder();
    b.build(&specs::price_with_pointer())
        .unwrap()
        .write_png(&path)
        .unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 8);
}

#[test]
fn test_rgba_image_matches_raster() {
    let mut b = builder();
    let image = b.build(&specs::short_label()).unwrap();
    let rgba = image.to_rgba_image();
    assert_eq!(rgba.dimensions(), (40, 36));
    assert_eq!(rgba.get_pixel(20, 18).0, image.pixel(20, 18).unwrap());
}

#[test]
fn test_layout_json_dump() {
    let b = builder();
    let json = b.layout(&specs::full()).to_json().unwrap();
    assert!(json.contains("\"canvas\""));
    assert!(json.contains("\"Apto 302\""));
    assert!(json.contains("16x16"));
}
