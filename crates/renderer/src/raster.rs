//! Painting element trees into pixel buffers.
//!
//! Draw order, back to front:
//! 1. Bubble and pointer, filled, then stroked as one outline
//! 2. Counter badge and counter text
//! 3. Labels, in cross-fade order
//! 4. Icon circle
//! 5. Icons, in cross-fade order
//!
//! Pixels are premultiplied RGBA as produced by tiny-skia.

use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, Mask, Paint, Path as SkPath, PathBuilder, Pixmap,
    PixmapPaint, Stroke, Transform,
};

use crate::element::{Element, ElementTree, Layered};
use crate::png;
use crate::typeface::Typeface;
use marker_common::{LayoutMetrics, MarkerError, MarkerResult, Rect, Rgb};
use storage::Weighted;

/// Cubic Bezier control distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// A rasterized marker.
///
/// Cloning shares the pixel buffer.
#[derive(Clone)]
pub struct RasterImage {
    pixmap: Arc<Pixmap>,
}

impl RasterImage {
    pub fn new(pixmap: Pixmap) -> Self {
        Self {
            pixmap: Arc::new(pixmap),
        }
    }

    /// Fully transparent image. Fails for a zero dimension.
    pub fn transparent(width: u32, height: u32) -> MarkerResult<Self> {
        Pixmap::new(width, height)
            .map(Self::new)
            .ok_or_else(|| MarkerError::InvalidCanvas(format!("{}x{} canvas", width, height)))
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Pixel area, used to classify transitions as growing or shrinking.
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let px = self.pixmap.pixel(x, y)?.demultiply();
        Some([px.red(), px.green(), px.blue(), px.alpha()])
    }

    /// Straight-alpha RGBA bytes, row major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        // Dimensions always match the byte length.
        RgbaImage::from_raw(self.width(), self.height(), self.to_rgba_bytes())
            .unwrap_or_else(|| RgbaImage::new(self.width(), self.height()))
    }

    /// Encode as PNG, indexed when the image has at most 256 colours.
    pub fn encode_png(&self) -> MarkerResult<Vec<u8>> {
        png::create_png_auto(&self.to_rgba_bytes(), self.width() as usize, self.height() as usize)
    }

    pub fn write_png(&self, path: impl AsRef<Path>) -> MarkerResult<()> {
        let path = path.as_ref();
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)
            .map_err(|e| MarkerError::Io(format!("{}: {}", path.display(), e)))
    }
}

impl Weighted for RasterImage {
    fn byte_size(&self) -> usize {
        self.pixmap.data().len()
    }
}

impl PartialEq for RasterImage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixmap, &other.pixmap)
            || (self.width() == other.width()
                && self.height() == other.height()
                && self.pixmap.data() == other.pixmap.data())
    }
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RasterImage({}x{})", self.width(), self.height())
    }
}

/// Paints element trees. Holds no per-marker state.
pub struct Rasterizer {
    typeface: Arc<Typeface>,
    stroke_width: f32,
    corner_radius: f32,
}

impl Rasterizer {
    /// `metrics` must already be scaled to pixels.
    pub fn new(typeface: Arc<Typeface>, metrics: &LayoutMetrics) -> Self {
        Self {
            typeface,
            stroke_width: metrics.stroke_width,
            corner_radius: metrics.corner_radius_px,
        }
    }

    /// Paint `tree` into an image sized to its canvas, rounded up.
    ///
    /// Fails only for a canvas without positive area, which layout never
    /// produces.
    pub fn rasterize(&self, tree: &ElementTree) -> MarkerResult<RasterImage> {
        let (width, height) = tree.pixel_size();
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            MarkerError::InvalidCanvas(format!("{}x{} canvas for {:?}", width, height, tree.label.primary().text()))
        })?;

        self.draw_body(&mut pixmap, &tree.bubble, &tree.pointer);

        if tree.counter_bubble.is_visible() {
            self.draw_badge(&mut pixmap, &tree.counter_bubble);
        }
        self.draw_labels(&mut pixmap, &tree.counter_label);
        self.draw_labels(&mut pixmap, &tree.label);

        if tree.icon_circle.is_visible() {
            draw_circle(&mut pixmap, &tree.icon_circle);
        }
        self.draw_icons(&mut pixmap, &tree.icon);

        Ok(RasterImage::new(pixmap))
    }

    /// Bubble plus pointer as one outline.
    ///
    /// tiny-skia has no path union, so each shape's stroke is masked by the
    /// other shape's interior instead. The seam between them carries no
    /// stroke, which is what stroking the unioned outline would give.
    fn draw_body(&self, pixmap: &mut Pixmap, bubble: &Element, pointer: &Element) {
        let Some(bubble_rect) = bubble.bounds.filter(|_| bubble.alpha > 0.0) else {
            return;
        };
        let Some(bubble_path) = pill_path(bubble_rect, self.corner_radius) else {
            return;
        };
        let pointer_path = pointer
            .bounds
            .filter(|rect| rect.height() > 0.0 && pointer.alpha > 0.0)
            .and_then(triangle_path);

        let fill = paint(bubble.fill, bubble.alpha);
        let outline = paint(bubble.stroke, bubble.alpha);
        let stroke = self.stroke();

        pixmap.fill_path(&bubble_path, &fill, FillRule::Winding, Transform::identity(), None);

        let Some(pointer_path) = pointer_path else {
            pixmap.stroke_path(&bubble_path, &outline, &stroke, Transform::identity(), None);
            return;
        };

        pixmap.fill_path(&pointer_path, &fill, FillRule::Winding, Transform::identity(), None);

        let outside_pointer = inverted_mask(pixmap, &pointer_path);
        let outside_bubble = inverted_mask(pixmap, &bubble_path);
        pixmap.stroke_path(
            &bubble_path,
            &outline,
            &stroke,
            Transform::identity(),
            outside_pointer.as_ref(),
        );
        pixmap.stroke_path(
            &pointer_path,
            &outline,
            &stroke,
            Transform::identity(),
            outside_bubble.as_ref(),
        );
    }

    fn draw_badge(&self, pixmap: &mut Pixmap, badge: &Element) {
        let Some(path) = badge.bounds.and_then(|rect| pill_path(rect, self.corner_radius)) else {
            return;
        };
        pixmap.fill_path(
            &path,
            &paint(badge.fill, badge.alpha),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        pixmap.stroke_path(
            &path,
            &paint(badge.stroke, badge.alpha),
            &self.stroke(),
            Transform::identity(),
            None,
        );
    }

    fn draw_labels(&self, pixmap: &mut Pixmap, labels: &Layered<Element>) {
        for label in labels.iter() {
            let (Some(bounds), Some(text)) = (label.bounds, label.text()) else {
                continue;
            };
            if label.alpha <= 0.0 {
                continue;
            }
            self.typeface.draw_text(
                pixmap,
                text,
                bounds.height(),
                bounds.left,
                bounds.top,
                label.fill,
                label.alpha,
            );
        }
    }

    fn draw_icons(&self, pixmap: &mut Pixmap, icons: &Layered<Element>) {
        for icon in icons.iter() {
            let (Some(bounds), Some(image)) = (icon.bounds, icon.image()) else {
                continue;
            };
            if icon.alpha <= 0.0 || image.width() == 0 || image.height() == 0 {
                continue;
            }
            let sx = bounds.width() / image.width() as f32;
            let sy = bounds.height() / image.height() as f32;
            let transform = Transform::from_row(sx, 0.0, 0.0, sy, bounds.left, bounds.top);
            let paint = PixmapPaint {
                opacity: icon.alpha.clamp(0.0, 1.0),
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            pixmap.draw_pixmap(0, 0, image.pixmap().as_ref(), &paint, transform, None);
        }
    }

    fn stroke(&self) -> Stroke {
        Stroke {
            width: self.stroke_width,
            line_cap: LineCap::Round,
            ..Stroke::default()
        }
    }
}

fn paint(color: Rgb, alpha: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, alpha_byte(alpha));
    paint.anti_alias = true;
    paint
}

fn alpha_byte(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn draw_circle(pixmap: &mut Pixmap, circle: &Element) {
    let Some(rect) = circle.bounds else {
        return;
    };
    let radius = rect.width().min(rect.height()) / 2.0;
    if let Some(path) = PathBuilder::from_circle(rect.center_x(), rect.center_y(), radius) {
        pixmap.fill_path(
            &path,
            &paint(circle.fill, circle.alpha),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

/// Coverage mask that is opaque everywhere outside `path`.
fn inverted_mask(pixmap: &Pixmap, path: &SkPath) -> Option<Mask> {
    let mut mask = Mask::new(pixmap.width(), pixmap.height())?;
    mask.fill_path(path, FillRule::Winding, true, Transform::identity());
    mask.invert();
    Some(mask)
}

/// Rounded rectangle whose corner radius is clamped to half its shorter side.
fn pill_path(rect: Rect, corner_radius: f32) -> Option<SkPath> {
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let r = corner_radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
    let k = r * KAPPA;
    let (l, t, rt, b) = (rect.left, rect.top, rect.right, rect.bottom);

    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.cubic_to(rt - r + k, t, rt, t + r - k, rt, t + r);
    pb.line_to(rt, b - r);
    pb.cubic_to(rt, b - r + k, rt - r + k, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.cubic_to(l + r - k, b, l, b - r + k, l, b - r);
    pb.line_to(l, t + r);
    pb.cubic_to(l, t + r - k, l + r - k, t, l + r, t);
    pb.close();
    pb.finish()
}

/// Downward isosceles triangle with its base along the top of `rect`.
fn triangle_path(rect: Rect) -> Option<SkPath> {
    let mut pb = PathBuilder::new();
    pb.move_to(rect.left, rect.top);
    pb.line_to(rect.right, rect.top);
    pb.line_to(rect.center_x(), rect.bottom);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pill_radius_is_clamped() {
        let path = pill_path(Rect::new(0.0, 0.0, 40.0, 20.0), 1000.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.width(), 40.0);
        assert_eq!(bounds.height(), 20.0);
    }

    #[test]
    fn test_degenerate_pill_is_none() {
        assert!(pill_path(Rect::new(0.0, 0.0, 0.0, 10.0), 5.0).is_none());
    }

    #[test]
    fn test_alpha_byte() {
        assert_eq!(alpha_byte(1.0), 255);
        assert_eq!(alpha_byte(0.0), 0);
        assert_eq!(alpha_byte(2.0), 255);
        assert_eq!(alpha_byte(0.5), 128);
    }

    #[test]
    fn test_raster_image_weight() {
        let image = RasterImage::new(Pixmap::new(10, 4).unwrap());
        assert_eq!(image.byte_size(), 160);
        assert_eq!(image.area(), 40);
    }
}
