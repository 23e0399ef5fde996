//! Marker image rendering.
//!
//! Pipeline:
//! - Layout: marker spec to element tree
//! - Interpolation between trees for transition frames
//! - Rasterization with tiny-skia, icons via resvg, text via rusttype
//! - PNG encoding

pub mod builder;
pub mod element;
pub mod icon;
pub mod interpolate;
pub mod layout;
pub mod png;
pub mod raster;
pub mod typeface;

pub use builder::MarkerBuilder;
pub use element::{Element, ElementTree, Layered, Payload};
pub use icon::{IconImage, IconRenderer, SvgIconRenderer};
pub use interpolate::Interpolator;
pub use layout::{resolve_colors, LayoutEngine, ResolvedColors};
pub use raster::{RasterImage, Rasterizer};
pub use typeface::{TextBounds, Typeface};
