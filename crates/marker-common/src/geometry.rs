//! Rectangle and map position types.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel space.
///
/// `top` is smaller than `bottom` (y grows downward), matching raster
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Create a new rectangle from its edges.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and a size.
    pub fn from_origin_size(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    /// Shrink the rectangle by `dx` horizontally and `dy` vertically on each side.
    pub fn inset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.right - dx, self.bottom - dy)
    }

    /// Area in square pixels; zero for inverted rectangles.
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Whether the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Check if a point is contained within this rectangle.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Geographic anchor of a marker on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let rect = Rect::new(1.0, 2.0, 11.0, 7.0);
        assert_eq!(rect.width(), 10.0);
        assert_eq!(rect.height(), 5.0);
        assert_eq!(rect.center_x(), 6.0);
        assert_eq!(rect.center_y(), 4.5);
        assert_eq!(rect.area(), 50.0);
    }

    #[test]
    fn test_inset() {
        let rect = Rect::new(0.0, 0.0, 40.0, 30.0).inset(0.75, 0.75);
        assert_eq!(rect, Rect::new(0.75, 0.75, 39.25, 29.25));
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::new(5.0, 5.0, 5.0, 10.0).is_empty());
        assert!(Rect::new(5.0, 5.0, 4.0, 10.0).is_empty());
        assert_eq!(Rect::new(5.0, 5.0, 4.0, 10.0).area(), 0.0);
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
