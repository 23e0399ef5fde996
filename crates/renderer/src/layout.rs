//! Marker layout: [`MarkerSpec`] to [`ElementTree`].
//!
//! Every size comes from [`LayoutMetrics`] scaled to the display density.
//! The marker is a pill-shaped bubble holding, left to right, an optional
//! icon on a circular backdrop, the label, and an optional counter badge.
//! An optional pointer triangle hangs below the bubble.
//!
//! Layout never fails. An icon that cannot be rendered produces icon and
//! icon-circle elements with alpha 0 and no payload, so every tree has the
//! same shape and can be paired for interpolation.

use std::sync::Arc;

use crate::element::{Element, ElementTree, Layered, Payload};
use crate::icon::IconRenderer;
use crate::typeface::Typeface;
use marker_common::{LayoutMetrics, MarkerConfig, MarkerSpec, Palette, Rect, Rgb, Variant};

/// Colours for one marker after applying its state flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedColors {
    pub marker: Rgb,
    pub text: Rgb,
    pub stroke: Rgb,
    pub icon_circle: Rgb,
    pub counter_bubble: Rgb,
    pub icon: Rgb,
}

/// Resolve colours in order: default, visualized, selected, special.
///
/// Selected wins over visualized. The special variant recolours the icon
/// unless the marker is visualized and not selected.
pub fn resolve_colors(palette: &Palette, spec: &MarkerSpec) -> ResolvedColors {
    let mut state = palette.default;
    if spec.is_visualized {
        state = palette.visualized;
    }
    if spec.is_selected {
        state = palette.selected;
    }

    let mut colors = ResolvedColors {
        marker: state.marker,
        text: state.text,
        stroke: state.stroke,
        icon_circle: state.icon_circle,
        counter_bubble: state.counter_bubble,
        icon: palette.icon,
    };

    let visualized_only = spec.is_visualized && !spec.is_selected;
    if spec.variant == Variant::Special && !visualized_only {
        colors.icon_circle = palette.special.icon_circle;
        colors.icon = palette.special.icon;
    }

    colors
}

/// Turns marker specs into element trees.
pub struct LayoutEngine {
    metrics: LayoutMetrics,
    palette: Palette,
    typeface: Arc<Typeface>,
    icons: Box<dyn IconRenderer>,
}

impl LayoutEngine {
    /// `density` converts the configured dp sizes to pixels.
    pub fn new(
        config: &MarkerConfig,
        density: f32,
        typeface: Arc<Typeface>,
        icons: Box<dyn IconRenderer>,
    ) -> Self {
        Self {
            metrics: config.layout.scaled(density),
            palette: config.palette.clone(),
            typeface,
            icons,
        }
    }

    /// Pixel metrics in use.
    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn typeface(&self) -> &Arc<Typeface> {
        &self.typeface
    }

    pub fn layout(&self, spec: &MarkerSpec) -> ElementTree {
        let m = &self.metrics;
        let s = m.stroke_width;
        let colors = resolve_colors(&self.palette, spec);

        let text = self.typeface.text_bounds(&spec.label, m.text_size);
        let marker_height = text.height() + 2.0 * m.padding_vertical + 2.0 * s;
        let bubble_height = marker_height - s;

        // Counter badge: pill with at least a circular footprint.
        let counter = spec.counter_text().map(|counter| {
            let bounds = self.typeface.text_bounds(counter, m.text_size);
            let badge_height = bubble_height - 2.0 * m.counter_padding;
            let badge_width = (bounds.width() + 2.0 * m.counter_padding).max(badge_height);
            (counter, bounds, badge_width, badge_height)
        });
        let counter_width = counter.map(|(_, _, w, _)| w).unwrap_or(0.0);

        let icon_image = spec.icon.as_ref().and_then(|icon| {
            self.icons
                .render_icon(icon, m.icon_size.round() as u32, colors.icon)
        });
        let icon_width = if icon_image.is_some() {
            m.icon_circle_size + m.icon_right_padding
        } else {
            0.0
        };

        let width = (text.width()
            + counter_width
            + 2.0 * m.padding_horizontal
            + 2.0 * s
            + icon_width)
            .max(m.min_marker_width);

        let pointer_height = if spec.has_pointer { m.pointer_height } else { 0.0 };

        let canvas = Element::new(Rect::new(0.0, 0.0, width, marker_height + pointer_height), colors.marker)
            .with_stroke(colors.stroke);

        let bubble = Element::new(
            Rect::new(s / 2.0, s / 2.0, s / 2.0 + (width - s), s / 2.0 + bubble_height),
            colors.marker,
        )
        .with_stroke(colors.stroke);

        // Text origin that centres the label's ink inside the marker.
        let text_x = width / 2.0 - text.width() / 2.0 - text.left as f32;
        let text_y = marker_height / 2.0 + text.height() / 2.0 - text.bottom as f32;

        let label_x = text_x + icon_width / 2.0 - counter_width / 2.0;
        let label = Element::new(
            Rect::new(label_x, text_y, label_x + text.width(), text_y + m.text_size),
            colors.text,
        )
        .with_payload(Some(Payload::Text(spec.label.clone())));

        let (counter_bubble, counter_label) = match counter {
            Some((counter, bounds, badge_width, badge_height)) => {
                let x = width - s - badge_width - m.counter_padding;
                let y = m.counter_padding + s / 2.0;
                let badge = Element::new(
                    Rect::new(x, y, x + badge_width, y + badge_height),
                    colors.counter_bubble,
                )
                .with_stroke(self.palette.counter_stroke);

                // Centred on the counter's own ink, not the label's.
                let counter_x = x + badge_width / 2.0 - bounds.width() / 2.0;
                let counter_y = marker_height / 2.0 + bounds.height() / 2.0 - bounds.bottom as f32;
                let counter_label = Element::new(
                    Rect::new(counter_x, counter_y, counter_x + bounds.width(), counter_y + m.text_size),
                    self.palette.counter_text,
                )
                .with_payload(Some(Payload::Text(counter.to_string())));
                (badge, counter_label)
            }
            None => (Element::absent(), Element::absent()),
        };

        let icon_alpha = if icon_image.is_some() { 1.0 } else { 0.0 };

        let circle_x = m.icon_left_padding + s;
        let circle_y = (bubble_height / 2.0 + s / 2.0) - m.icon_circle_size / 2.0;
        let icon_circle = Element::new(
            Rect::from_origin_size(circle_x, circle_y, m.icon_circle_size, m.icon_circle_size),
            colors.icon_circle,
        )
        .with_alpha(icon_alpha);

        let icon_x = m.icon_left_padding + s + (m.icon_circle_size - m.icon_size) / 2.0;
        let icon_y = bubble_height / 2.0 - m.icon_size / 2.0 + s / 2.0;
        let icon = Element::new(
            Rect::from_origin_size(icon_x, icon_y, m.icon_size, m.icon_size),
            colors.icon,
        )
        .with_alpha(icon_alpha)
        .with_payload(icon_image.map(Payload::Image));

        let pointer_x = width / 2.0 - m.pointer_half_width;
        let pointer = Element::new(
            Rect::from_origin_size(
                pointer_x,
                marker_height - s,
                2.0 * m.pointer_half_width,
                pointer_height,
            ),
            colors.marker,
        )
        .with_stroke(colors.stroke);

        ElementTree {
            canvas,
            bubble,
            counter_bubble,
            label: Layered::Single(label),
            counter_label: Layered::Single(counter_label),
            icon: Layered::Single(icon),
            icon_circle,
            pointer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::IconImage;
    use marker_common::IconRef;

    /// Renders every icon as an opaque square, or fails for "broken".
    struct SolidIcons;

    impl IconRenderer for SolidIcons {
        fn render_icon(&self, icon: &IconRef, size_px: u32, _color: Rgb) -> Option<IconImage> {
            if icon.as_str() == "broken" {
                return None;
            }
            let mut pixmap = tiny_skia::Pixmap::new(size_px, size_px)?;
            pixmap.fill(tiny_skia::Color::BLACK);
            Some(IconImage::new(pixmap))
        }
    }

    fn engine() -> LayoutEngine {
        LayoutEngine::new(
            &MarkerConfig::default(),
            1.0,
            Arc::new(Typeface::estimated()),
            Box::new(SolidIcons),
        )
    }

    #[test]
    fn test_color_resolution_order() {
        let palette = Palette::default();

        let plain = resolve_colors(&palette, &MarkerSpec::new("a"));
        assert_eq!(plain.marker, palette.default.marker);

        let visualized = resolve_colors(&palette, &MarkerSpec::new("a").visualized(true));
        assert_eq!(visualized.marker, palette.visualized.marker);

        let both = resolve_colors(&palette, &MarkerSpec::new("a").visualized(true).selected(true));
        assert_eq!(both.marker, palette.selected.marker);
    }

    #[test]
    fn test_special_variant_icon_colors() {
        let palette = Palette::default();
        let special = MarkerSpec::new("a").with_variant(Variant::Special);

        let colors = resolve_colors(&palette, &special);
        assert_eq!(colors.icon, palette.special.icon);
        assert_eq!(colors.icon_circle, palette.special.icon_circle);

        // Visualized but not selected keeps the state colours.
        let colors = resolve_colors(&palette, &special.clone().visualized(true));
        assert_eq!(colors.icon, palette.icon);
        assert_eq!(colors.icon_circle, palette.visualized.icon_circle);

        // Selected brings the special colours back.
        let colors = resolve_colors(&palette, &special.visualized(true).selected(true));
        assert_eq!(colors.icon, palette.special.icon);
    }

    #[test]
    fn test_bubble_inset_by_half_stroke() {
        let tree = engine().layout(&MarkerSpec::new("42"));
        let canvas = tree.canvas.bounds.unwrap();
        let bubble = tree.bubble.bounds.unwrap();
        assert_eq!(bubble.left, 0.75);
        assert_eq!(bubble.top, 0.75);
        assert_eq!(bubble.right, canvas.right - 0.75);
        assert_eq!(bubble.bottom, canvas.bottom - 0.75);
    }

    #[test]
    fn test_icon_reserves_width() {
        let engine = engine();
        let plain = engine.layout(&MarkerSpec::new("Casa longa"));
        let with_icon = engine.layout(&MarkerSpec::new("Casa longa").with_icon(IconRef::new("ok")));

        let plain_w = plain.canvas.bounds.unwrap().width();
        let icon_w = with_icon.canvas.bounds.unwrap().width();
        assert_eq!(icon_w - plain_w, 24.0 + 3.0);
        assert_eq!(with_icon.icon.primary().alpha, 1.0);
        assert!(with_icon.icon.primary().image().is_some());
    }

    #[test]
    fn test_failed_icon_keeps_tree_shape() {
        let tree = engine().layout(&MarkerSpec::new("Casa").with_icon(IconRef::new("broken")));
        let icon = tree.icon.primary();
        assert!(icon.is_present());
        assert_eq!(icon.alpha, 0.0);
        assert!(icon.payload.is_none());
        assert!(tree.icon_circle.is_present());
        assert_eq!(tree.icon_circle.alpha, 0.0);
    }

    #[test]
    fn test_counter_badge_is_at_least_circular() {
        let tree = engine().layout(&MarkerSpec::new("Casa").with_counter("1"));
        let badge = tree.counter_bubble.bounds.unwrap();
        assert!(badge.width() >= badge.height());
        // Badge height is the bubble height minus padding on both sides.
        let bubble = tree.bubble.bounds.unwrap();
        assert_eq!(badge.height(), bubble.height() - 12.0);
        assert_eq!(tree.counter_label.primary().text(), Some("1"));
    }

    #[test]
    fn test_no_counter_is_absent() {
        let tree = engine().layout(&MarkerSpec::new("Casa"));
        assert!(!tree.counter_bubble.is_present());
        assert!(!tree.counter_label.primary().is_present());
    }

    #[test]
    fn test_pointer_extends_canvas() {
        let engine = engine();
        let flat = engine.layout(&MarkerSpec::new("42"));
        let pointed = engine.layout(&MarkerSpec::new("42").with_pointer(true));

        assert_eq!(flat.pointer.bounds.unwrap().height(), 0.0);
        assert_eq!(pointed.pointer.bounds.unwrap().height(), 6.0);
        assert_eq!(
            pointed.canvas.bounds.unwrap().height(),
            flat.canvas.bounds.unwrap().height() + 6.0
        );
        let pointer = pointed.pointer.bounds.unwrap();
        assert_eq!(pointer.center_x(), pointed.canvas.bounds.unwrap().center_x());
    }
}
