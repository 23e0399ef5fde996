//! Label text measurement and glyph drawing.
//!
//! A [`Typeface`] either wraps a TrueType font loaded with rusttype or, when
//! no font is available, falls back to estimated metrics. The estimated
//! typeface measures text like a narrow monospace face and draws nothing,
//! which keeps layout deterministic in environments without font files.

use rusttype::{point, Font, Scale};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tiny_skia::Pixmap;
use tracing::{debug, warn};

use marker_common::{MarkerError, MarkerResult, Rgb};

/// Advance width of one character as a fraction of the type size.
const ESTIMATED_ADVANCE: f32 = 0.6;

/// Cap height as a fraction of the type size.
const ESTIMATED_CAP_HEIGHT: f32 = 0.72;

/// Integer text bounds relative to the drawing origin on the baseline.
///
/// `top` is negative for glyphs rising above the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBounds {
    pub fn width(&self) -> f32 {
        (self.right - self.left) as f32
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top) as f32
    }
}

enum Face {
    TrueType(Font<'static>),
    Estimated,
}

/// Font resource shared by layout and rasterization.
pub struct Typeface {
    face: Face,
    warned_no_glyphs: AtomicBool,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.face {
            Face::TrueType(_) => f.write_str("Typeface(TrueType)"),
            Face::Estimated => f.write_str("Typeface(Estimated)"),
        }
    }
}

impl Typeface {
    /// Load a TrueType/OpenType font from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> MarkerResult<Self> {
        let font = Font::try_from_vec(data)
            .ok_or_else(|| MarkerError::FontLoad("unrecognised font data".to_string()))?;
        Ok(Self {
            face: Face::TrueType(font),
            warned_no_glyphs: AtomicBool::new(false),
        })
    }

    /// Load a font file.
    pub fn from_file(path: impl AsRef<Path>) -> MarkerResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| MarkerError::FontLoad(format!("{}: {}", path.display(), e)))?;
        let typeface = Self::from_bytes(data)
            .map_err(|e| MarkerError::FontLoad(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded label font");
        Ok(typeface)
    }

    /// Metrics-only typeface that measures text but draws no glyphs.
    pub fn estimated() -> Self {
        Self {
            face: Face::Estimated,
            warned_no_glyphs: AtomicBool::new(false),
        }
    }

    pub fn has_glyphs(&self) -> bool {
        matches!(self.face, Face::TrueType(_))
    }

    /// Tight pixel bounds of `text` drawn at `size` with its origin at (0, 0).
    ///
    /// Empty text has zero bounds.
    pub fn text_bounds(&self, text: &str, size: f32) -> TextBounds {
        if text.is_empty() {
            return TextBounds::default();
        }

        match &self.face {
            Face::Estimated => {
                let chars = text.chars().count() as f32;
                TextBounds {
                    left: 0,
                    top: -(ESTIMATED_CAP_HEIGHT * size).round() as i32,
                    right: (chars * ESTIMATED_ADVANCE * size).round() as i32,
                    bottom: 0,
                }
            }
            Face::TrueType(font) => {
                let mut bounds: Option<TextBounds> = None;
                for glyph in font.layout(text, Scale::uniform(size), point(0.0, 0.0)) {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        let b = bounds.get_or_insert(TextBounds {
                            left: bb.min.x,
                            top: bb.min.y,
                            right: bb.max.x,
                            bottom: bb.max.y,
                        });
                        b.left = b.left.min(bb.min.x);
                        b.top = b.top.min(bb.min.y);
                        b.right = b.right.max(bb.max.x);
                        b.bottom = b.bottom.max(bb.max.y);
                    }
                }
                // Whitespace-only text has an advance but no ink.
                bounds.unwrap_or(TextBounds {
                    left: 0,
                    top: 0,
                    right: self.advance_width(text, size).round() as i32,
                    bottom: 0,
                })
            }
        }
    }

    /// Horizontal advance of `text` including kerning.
    pub fn advance_width(&self, text: &str, size: f32) -> f32 {
        self.char_advances(text, size).sum()
    }

    /// Number of leading characters of `text` whose advance fits in `max_width`.
    pub fn chars_fitting(&self, text: &str, size: f32, max_width: f32) -> usize {
        let mut used = 0.0;
        let mut count = 0;
        for advance in self.char_advances(text, size) {
            if used + advance > max_width {
                break;
            }
            used += advance;
            count += 1;
        }
        count
    }

    /// Per-character advances, with kerning against the previous character
    /// folded into each.
    fn char_advances<'a>(&'a self, text: &'a str, size: f32) -> Box<dyn Iterator<Item = f32> + 'a> {
        match &self.face {
            Face::Estimated => Box::new(text.chars().map(move |_| ESTIMATED_ADVANCE * size)),
            Face::TrueType(font) => {
                let scale = Scale::uniform(size);
                let mut previous: Option<char> = None;
                Box::new(text.chars().map(move |c| {
                    let kerning = previous.map(|p| font.pair_kerning(scale, p, c)).unwrap_or(0.0);
                    previous = Some(c);
                    kerning + font.glyph(c).scaled(scale).h_metrics().advance_width
                }))
            }
        }
    }

    /// Draw `text` with its baseline origin at (`x`, `baseline`).
    ///
    /// Coverage is multiplied by `alpha` and blended source-over into the
    /// premultiplied pixmap.
    pub fn draw_text(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        size: f32,
        x: f32,
        baseline: f32,
        color: Rgb,
        alpha: f32,
    ) {
        let font = match &self.face {
            Face::TrueType(font) => font,
            Face::Estimated => {
                if !self.warned_no_glyphs.swap(true, Ordering::Relaxed) {
                    warn!("No label font loaded; marker text is measured but not drawn");
                }
                return;
            }
        };

        let width = pixmap.width() as i32;
        let height = pixmap.height() as i32;
        let data = pixmap.data_mut();

        for glyph in font.layout(text, Scale::uniform(size), point(x, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                let idx = ((py * width + px) * 4) as usize;
                blend_premultiplied(&mut data[idx..idx + 4], color, coverage * alpha);
            });
        }
    }
}

/// Source-over blend of a solid colour with coverage `src_a` onto one
/// premultiplied RGBA pixel.
fn blend_premultiplied(dst: &mut [u8], color: Rgb, src_a: f32) {
    let src_a = src_a.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }
    let inv = 1.0 - src_a;
    let src = [color.r, color.g, color.b];
    for channel in 0..3 {
        let value = src[channel] as f32 * src_a + dst[channel] as f32 * inv;
        dst[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    let a = 255.0 * src_a + dst[3] as f32 * inv;
    dst[3] = a.round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_bounds() {
        let face = Typeface::estimated();
        let bounds = face.text_bounds("42", 12.0);
        assert_eq!(bounds, TextBounds { left: 0, top: -9, right: 14, bottom: 0 });
        assert_eq!(bounds.width(), 14.0);
        assert_eq!(bounds.height(), 9.0);
    }

    #[test]
    fn test_empty_text_has_zero_bounds() {
        let face = Typeface::estimated();
        assert_eq!(face.text_bounds("", 12.0), TextBounds::default());
    }

    #[test]
    fn test_estimated_chars_fitting() {
        let face = Typeface::estimated();
        // 7.2px per char at size 12
        assert_eq!(face.chars_fitting("12345", 12.0, 36.0), 5);
        assert_eq!(face.chars_fitting("12345", 12.0, 20.0), 2);
        assert_eq!(face.chars_fitting("12345", 12.0, 0.0), 0);
        assert_eq!(face.chars_fitting("", 12.0, 100.0), 0);
    }

    #[test]
    fn test_estimated_draw_is_noop() {
        let face = Typeface::estimated();
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        face.draw_text(&mut pixmap, "hi", 12.0, 0.0, 12.0, Rgb::BLACK, 1.0);
        assert!(pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_blend_full_coverage_replaces() {
        let mut px = [10, 20, 30, 255];
        blend_premultiplied(&mut px, Rgb::new(200, 100, 50), 1.0);
        assert_eq!(px, [200, 100, 50, 255]);
    }

    #[test]
    fn test_blend_half_coverage_onto_transparent() {
        let mut px = [0, 0, 0, 0];
        blend_premultiplied(&mut px, Rgb::new(255, 255, 255), 0.5);
        assert_eq!(px, [128, 128, 128, 128]);
    }

    #[test]
    fn test_invalid_font_bytes() {
        let result = Typeface::from_bytes(vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(MarkerError::FontLoad(_))));
    }
}
