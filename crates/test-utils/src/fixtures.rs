//! Common test fixtures for marker tests.
//!
//! This module provides pre-defined marker specs and icons that represent
//! the scenarios the renderer and transition tests exercise.

/// Inline SVG icons.
pub mod icons {
    use marker_common::IconRef;

    /// Solid 24x24 house silhouette.
    pub const HOUSE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path d="M12 3 L2 12 H5 V21 H10 V15 H14 V21 H19 V12 H22 Z" fill="black"/></svg>"#;

    /// Solid 24x24 five-point star.
    pub const STAR_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path d="M12 2 L15 9 L22 9 L16.5 13.5 L18.5 21 L12 16.5 L5.5 21 L7.5 13.5 L2 9 L9 9 Z" fill="black"/></svg>"#;

    /// Filled square covering the whole viewbox.
    pub const SQUARE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10"><rect x="0" y="0" width="10" height="10" fill="red"/></svg>"#;

    /// Not SVG at all.
    pub const BROKEN_SVG: &str = "this is not an svg document";

    pub fn house() -> IconRef {
        IconRef::new(HOUSE_SVG)
    }

    pub fn star() -> IconRef {
        IconRef::new(STAR_SVG)
    }

    pub fn square() -> IconRef {
        IconRef::new(SQUARE_SVG)
    }

    pub fn broken() -> IconRef {
        IconRef::new(BROKEN_SVG)
    }
}

/// Named marker specs.
pub mod specs {
    use marker_common::{MarkerSpec, Variant};

    /// Two-digit label, nothing else. Narrower than the minimum width.
    pub fn short_label() -> MarkerSpec {
        MarkerSpec::new("42")
    }

    /// Single character label.
    pub fn one_char() -> MarkerSpec {
        MarkerSpec::new("1")
    }

    /// Five character label.
    pub fn five_chars() -> MarkerSpec {
        MarkerSpec::new("12345")
    }

    /// Price-style label wide enough to exceed the minimum width.
    pub fn price() -> MarkerSpec {
        MarkerSpec::new("R$ 1.250.000")
    }

    /// Price with a pointer tail.
    pub fn price_with_pointer() -> MarkerSpec {
        price().with_pointer(true)
    }

    /// Price with a counter badge.
    pub fn price_with_counter() -> MarkerSpec {
        price().with_counter("+3")
    }

    /// Label with an icon.
    pub fn with_house_icon() -> MarkerSpec {
        MarkerSpec::new("Casa").with_icon(super::icons::house())
    }

    /// Label, counter, icon and pointer together.
    pub fn full() -> MarkerSpec {
        MarkerSpec::new("Apto 302")
            .with_counter("12")
            .with_icon(super::icons::house())
            .with_pointer(true)
    }

    /// Special variant with an icon.
    pub fn special_with_icon() -> MarkerSpec {
        MarkerSpec::new("Destaque")
            .with_icon(super::icons::star())
            .with_variant(Variant::Special)
    }

    /// Spec whose icon cannot be decoded.
    pub fn broken_icon() -> MarkerSpec {
        MarkerSpec::new("Casa").with_icon(super::icons::broken())
    }
}
