//! PNG encoding for straight-alpha RGBA marker images.
//!
//! Markers are flat-coloured with anti-aliased edges, so most of them fit
//! in a 256-entry palette:
//! - **Indexed PNG (color type 3)**: used when the image has ≤256 unique colours.
//! - **RGBA PNG (color type 6)**: fallback for anything richer (glyph
//!   anti-aliasing over gradients, large icons).
//!
//! `create_png_auto` picks the mode; `create_png_rgba` forces RGBA.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Write;

use marker_common::{MarkerError, MarkerResult};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colours for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Pixel count above which palette extraction runs on the rayon pool.
const PARALLEL_THRESHOLD: usize = 4096;

/// RGBA palette plus one index byte per pixel.
type IndexedPixels = (Vec<[u8; 4]>, Vec<u8>);

/// Encode RGBA pixels, choosing indexed or RGBA by colour count.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> MarkerResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let indexed = if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        index_colors_parallel(pixels)
    } else {
        index_colors(pixels)
    };

    match indexed {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png_rgba(pixels, width, height),
    }
}

/// Encode RGBA pixels as colour type 6.
pub fn create_png_rgba(pixels: &[u8], width: usize, height: usize) -> MarkerResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let mut png = Vec::with_capacity(pixels.len() / 2 + 64);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, 6));
    write_chunk(&mut png, b"IDAT", &deflate_rows(pixels, width * 4, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode a palette and per-pixel indices as colour type 3.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> MarkerResult<Vec<u8>> {
    if indices.len() != width * height {
        return Err(MarkerError::Encode(format!(
            "{} indices for a {}x{} image",
            indices.len(),
            width,
            height
        )));
    }

    let mut png = Vec::with_capacity(indices.len() / 2 + palette.len() * 4 + 64);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // Marker corners are transparent, so tRNS is nearly always present.
    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_rows(indices, width, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> MarkerResult<()> {
    if width == 0 || height == 0 {
        return Err(MarkerError::Encode(format!("empty image {}x{}", width, height)));
    }
    if pixels.len() != width * height * 4 {
        return Err(MarkerError::Encode(format!(
            "{} bytes for a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }
    Ok(())
}

/// IHDR payload: 8-bit depth, no interlace.
fn header(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    ihdr[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    ihdr[8] = 8;
    ihdr[9] = color_type;
    ihdr
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_rows(data: &[u8], row_bytes: usize, height: usize) -> MarkerResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (row_bytes + 1));
    for row in data.chunks_exact(row_bytes).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .and_then(|_| encoder.finish())
        .map_err(|e| MarkerError::Encode(format!("IDAT compression failed: {}", e)))
}

fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);

    png.extend_from_slice(kind);
    png.extend_from_slice(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Build a palette in first-seen order, or `None` past 256 colours.
fn index_colors(pixels: &[u8]) -> Option<IndexedPixels> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px);
        let index = match lookup.get(&key) {
            Some(&index) => index,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let index = palette.len() as u8;
                palette.push([px[0], px[1], px[2], px[3]]);
                lookup.insert(key, index);
                index
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel variant of [`index_colors`] for large images.
///
/// Chunks collect their distinct colours independently; the merged set is
/// sorted and checked against the palette limit before pixels are mapped
/// in parallel.
fn index_colors_parallel(pixels: &[u8]) -> Option<IndexedPixels> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads().max(1)).max(256);
    let chunk_bytes = chunk_pixels * 4;

    let per_chunk: Vec<HashSet<u32>> = pixels
        .par_chunks(chunk_bytes)
        .map(|chunk| {
            let mut seen = HashSet::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack(px));
                if seen.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            seen
        })
        .collect();

    // Sorted so the palette, and the encoded bytes, are reproducible.
    let mut keys: Vec<u32> = per_chunk.into_iter().flatten().collect();
    keys.sort_unstable();
    keys.dedup();
    if keys.len() > MAX_PALETTE_SIZE {
        return None;
    }

    let lookup: HashMap<u32, u8> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| (*key, i as u8))
        .collect();
    let palette: Vec<[u8; 4]> = keys.iter().map(|key| key.to_le_bytes()).collect();

    let indices: Vec<u8> = pixels
        .par_chunks(4)
        .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
        .collect();

    Some((palette, indices))
}
