//! Interpolation between two element trees.
//!
//! Geometry, colour and alpha are interpolated linearly. Text and icon
//! payloads cannot be blended, so they cross-fade instead: the tree carries
//! both payloads with complementary alphas.
//!
//! `step` 0 and 1 return the input trees unchanged. Optional elements that
//! are absent on one side would otherwise stay absent at the endpoints.

use std::sync::Arc;

use crate::element::{Element, ElementTree, Layered, Payload};
use crate::typeface::Typeface;
use marker_common::Rect;

/// Label text is clipped to this multiple of the interpolated label width.
const TEXT_CLIP_FACTOR: f32 = 1.2;

/// Linear interpolation exact at both endpoints.
pub fn lerp(start: f32, end: f32, step: f32) -> f32 {
    start * (1.0 - step) + end * step
}

pub fn lerp_rect(start: &Rect, end: &Rect, step: f32) -> Rect {
    Rect::new(
        lerp(start.left, end.left, step),
        lerp(start.top, end.top, step),
        lerp(start.right, end.right, step),
        lerp(start.bottom, end.bottom, step),
    )
}

/// Interpolate geometry, colours and alpha. Payloads are dropped.
///
/// Absent on either side gives absent.
pub fn lerp_element(start: &Element, end: &Element, step: f32) -> Element {
    match (start.bounds, end.bounds) {
        (Some(a), Some(b)) => Element {
            bounds: Some(lerp_rect(&a, &b, step)),
            fill: start.fill.lerp(end.fill, step),
            stroke: start.stroke.lerp(end.stroke, step),
            alpha: lerp(start.alpha, end.alpha, step),
            payload: None,
        },
        _ => Element::absent(),
    }
}

/// Builds intermediate trees for transitions.
pub struct Interpolator {
    typeface: Arc<Typeface>,
}

impl Interpolator {
    pub fn new(typeface: Arc<Typeface>) -> Self {
        Self { typeface }
    }

    /// Both trees must come from layout (single labels and icons).
    pub fn interpolate(&self, start: &ElementTree, end: &ElementTree, step: f32) -> ElementTree {
        if step <= 0.0 {
            return start.clone();
        }
        if step >= 1.0 {
            return end.clone();
        }

        ElementTree {
            canvas: lerp_element(&start.canvas, &end.canvas, step),
            bubble: lerp_element(&start.bubble, &end.bubble, step),
            counter_bubble: lerp_element(&start.counter_bubble, &end.counter_bubble, step),
            label: self.cross_fade_text(&start.label, &end.label, step),
            counter_label: self.cross_fade_text(&start.counter_label, &end.counter_label, step),
            icon: cross_fade_icon(&start.icon, &end.icon, step),
            icon_circle: lerp_element(&start.icon_circle, &end.icon_circle, step),
            pointer: lerp_element(&start.pointer, &end.pointer, step),
        }
    }

    fn cross_fade_text(
        &self,
        start: &Layered<Element>,
        end: &Layered<Element>,
        step: f32,
    ) -> Layered<Element> {
        let (from, to) = (start.primary(), end.primary());
        let base = lerp_element(from, to, step);
        let Some(bounds) = base.bounds else {
            return Layered::Single(base);
        };

        let (from_text, to_text) = match (from.text(), to.text()) {
            (Some(a), Some(b)) if a != b => (a, b),
            (a, b) => {
                let text = a.or(b).map(|t| Payload::Text(t.to_string()));
                return Layered::Single(base.with_alpha(1.0).with_payload(text));
            }
        };

        let size = bounds.height();
        let max_width = bounds.width() * TEXT_CLIP_FACTOR;
        let clip = |text: &str| -> String {
            let n = self.typeface.chars_fitting(text, size, max_width);
            text.chars().take(n).collect()
        };

        Layered::CrossFade(
            base.clone()
                .with_alpha(1.0 - step)
                .with_payload(Some(Payload::Text(clip(from_text)))),
            base.with_alpha(step)
                .with_payload(Some(Payload::Text(clip(to_text)))),
        )
    }
}

fn cross_fade_icon(start: &Layered<Element>, end: &Layered<Element>, step: f32) -> Layered<Element> {
    let (from, to) = (start.primary(), end.primary());
    let base = lerp_element(from, to, step);

    match (from.image(), to.image()) {
        (None, None) => Layered::Single(base),
        (Some(image), None) | (None, Some(image)) => {
            Layered::Single(base.with_payload(Some(Payload::Image(image.clone()))))
        }
        (Some(a), Some(b)) if a == b => {
            Layered::Single(base.with_payload(Some(Payload::Image(a.clone()))))
        }
        (Some(a), Some(b)) => {
            let alpha = base.alpha;
            Layered::CrossFade(
                base.clone()
                    .with_alpha(alpha * (1.0 - step))
                    .with_payload(Some(Payload::Image(a.clone()))),
                base.with_alpha(alpha * step)
                    .with_payload(Some(Payload::Image(b.clone()))),
            )
        }
    }
}
