//! Positioned visual primitives making up one marker.

use serde::Serialize;

use crate::icon::IconImage;
use marker_common::{Rect, Rgb};

/// Content carried by an element besides its geometry and colours.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Text(String),
    Image(IconImage),
}

/// A single positioned visual primitive.
///
/// `bounds == None` means the element is not present in this tree; it is
/// skipped by the rasterizer and propagates absence through interpolation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub bounds: Option<Rect>,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub alpha: f32,
    pub payload: Option<Payload>,
}

impl Element {
    /// A present, fully opaque element with the given bounds and fill.
    pub fn new(bounds: Rect, fill: Rgb) -> Self {
        Self {
            bounds: Some(bounds),
            fill,
            stroke: fill,
            alpha: 1.0,
            payload: None,
        }
    }

    /// Placeholder for an element missing from this tree.
    pub fn absent() -> Self {
        Self {
            bounds: None,
            fill: Rgb::BLACK,
            stroke: Rgb::BLACK,
            alpha: 0.0,
            payload: None,
        }
    }

    pub fn with_stroke(mut self, stroke: Rgb) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_payload(mut self, payload: Option<Payload>) -> Self {
        self.payload = payload;
        self
    }

    pub fn is_present(&self) -> bool {
        self.bounds.is_some()
    }

    /// Present with non-zero alpha.
    pub fn is_visible(&self) -> bool {
        self.bounds.is_some() && self.alpha > 0.0
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&IconImage> {
        match &self.payload {
            Some(Payload::Image(image)) => Some(image),
            _ => None,
        }
    }
}

/// One element, or two overlapping ones mid cross-fade.
///
/// Cross-fade parts are drawn first to last.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layered<T> {
    Single(T),
    CrossFade(T, T),
}

impl<T> Layered<T> {
    /// The single element, or the outgoing one of a cross-fade.
    pub fn primary(&self) -> &T {
        match self {
            Layered::Single(item) | Layered::CrossFade(item, _) => item,
        }
    }

    /// Elements in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (first, second) = match self {
            Layered::Single(item) => (item, None),
            Layered::CrossFade(from, to) => (from, Some(to)),
        };
        std::iter::once(first).chain(second)
    }

    pub fn len(&self) -> usize {
        match self {
            Layered::Single(_) => 1,
            Layered::CrossFade(..) => 2,
        }
    }

    pub fn is_cross_fade(&self) -> bool {
        matches!(self, Layered::CrossFade(..))
    }
}

/// Fixed-shape decomposition of one marker at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementTree {
    /// Overall image bounds, origin at (0, 0).
    pub canvas: Element,
    pub bubble: Element,
    pub counter_bubble: Element,
    /// Label text; bounds top is the baseline, height is the type size.
    pub label: Layered<Element>,
    pub counter_label: Layered<Element>,
    pub icon: Layered<Element>,
    pub icon_circle: Element,
    /// Pointer triangle; zero height when the marker has no pointer.
    pub pointer: Element,
}

impl ElementTree {
    /// Canvas width and height in pixels, rounded up.
    pub fn pixel_size(&self) -> (u32, u32) {
        match self.canvas.bounds {
            Some(rect) => (
                rect.right.ceil().max(0.0) as u32,
                rect.bottom.ceil().max(0.0) as u32,
            ),
            None => (0, 0),
        }
    }

    /// Serialize the tree for debugging output.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layered_iter_order() {
        let single = Layered::Single(1);
        assert_eq!(single.iter().copied().collect::<Vec<_>>(), vec![1]);

        let fade = Layered::CrossFade(1, 2);
        assert_eq!(fade.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(*fade.primary(), 1);
        assert_eq!(fade.len(), 2);
    }

    #[test]
    fn test_absent_element_is_not_visible() {
        let e = Element::absent();
        assert!(!e.is_present());
        assert!(!e.is_visible());

        let hidden = Element::new(Rect::new(0.0, 0.0, 1.0, 1.0), Rgb::WHITE).with_alpha(0.0);
        assert!(hidden.is_present());
        assert!(!hidden.is_visible());
    }

    #[test]
    fn test_payload_accessors() {
        let e = Element::new(Rect::default(), Rgb::BLACK)
            .with_payload(Some(Payload::Text("42".into())));
        assert_eq!(e.text(), Some("42"));
        assert!(e.image().is_none());
    }
}
