//! Test helpers shared by the marker crates: fixtures, generators, font
//! lookup and float assertions.

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Evaluates to a font path, or returns from the calling test when the
/// machine has no usable TrueType font.
///
/// Layout tests run on estimated metrics and never need this; only tests
/// that inspect drawn glyph pixels do.
#[macro_export]
macro_rules! require_test_font {
    () => {{
        match $crate::find_test_font() {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: No TrueType font found. Set TEST_FONT or place one in testdata/."
                );
                return;
            }
        }
    }};
}

/// `|left - right| <= epsilon`, compared as f64.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (l, r, eps) = ($left as f64, $right as f64, $epsilon as f64);
        if (l - r).abs() > eps {
            panic!(
                "assertion failed: {} ≈ {} (diff {} exceeds {})",
                l, r, (l - r).abs(), eps
            );
        }
    }};
}

/// Edge-by-edge [`assert_approx_eq!`] on two `Rect`s.
#[macro_export]
macro_rules! assert_rect_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = $left;
        let right = $right;
        $crate::assert_approx_eq!(left.left, right.left, $epsilon);
        $crate::assert_approx_eq!(left.top, right.top, $epsilon);
        $crate::assert_approx_eq!(left.right, right.right, $epsilon);
        $crate::assert_approx_eq!(left.bottom, right.bottom, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    use marker_common::Rect;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_rect_approx_eq_passes() {
        assert_rect_approx_eq!(
            Rect::new(0.0001, 1.0, 40.0, 36.0001),
            Rect::new(0.0, 1.0, 40.0, 36.0),
            0.001
        );
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_rect_approx_eq_fails() {
        assert_rect_approx_eq!(Rect::new(0.0, 0.0, 41.0, 36.0), Rect::new(0.0, 0.0, 40.0, 36.0), 0.5);
    }
}
