//! Generators for marker specs and pixel buffers.

use marker_common::{MarkerSpec, Variant};

/// A label of `len` characters cycling through the digits.
pub fn label_of_len(len: usize) -> String {
    (0..len)
        .map(|i| char::from(b'0' + (i % 10) as u8))
        .collect()
}

/// Every combination of the boolean flags and variant on one label.
///
/// Returns 32 specs: pointer x selected x visualized x variant x counter.
pub fn spec_matrix(label: &str) -> Vec<MarkerSpec> {
    let mut specs = Vec::with_capacity(32);
    for bits in 0..32u8 {
        let mut spec = MarkerSpec::new(label)
            .with_pointer(bits & 1 != 0)
            .selected(bits & 2 != 0)
            .visualized(bits & 4 != 0);
        if bits & 8 != 0 {
            spec = spec.with_variant(Variant::Special);
        }
        if bits & 16 != 0 {
            spec = spec.with_counter("7");
        }
        specs.push(spec);
    }
    specs
}

/// Labels of increasing length, from empty up to `max_len` characters.
pub fn growing_labels(max_len: usize) -> Vec<MarkerSpec> {
    (0..=max_len)
        .map(|len| MarkerSpec::new(label_of_len(len)))
        .collect()
}

/// Generates straight (non-premultiplied) RGBA pixel data with many colours.
///
/// Each pixel gets a different colour, useful for exercising the RGBA PNG
/// fallback.
pub fn create_test_rgba_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 255 / width.max(1)) as u8);
            pixels.push((y * 255 / height.max(1)) as u8);
            pixels.push(((x + y) % 256) as u8);
            pixels.push(255);
        }
    }
    pixels
}

/// Generates RGBA pixels using only a handful of marker-like colours.
///
/// Transparent corners, a white body and a dark centre stripe.
pub fn create_marker_like_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let corner = (x < 2 || x + 2 >= width) && (y < 2 || y + 2 >= height);
            let stripe = y == height / 2;
            let rgba = if corner {
                [0, 0, 0, 0]
            } else if stripe {
                [0, 0, 0, 255]
            } else {
                [255, 255, 255, 255]
            };
            pixels.extend_from_slice(&rgba);
        }
    }
    pixels
}
