//! Common types and utilities shared across the marker crates.

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod spec;

pub use color::Rgb;
pub use config::{CacheConfig, LayoutMetrics, MarkerConfig, Palette, TransitionConfig};
pub use error::{MarkerError, MarkerResult};
pub use geometry::{LatLng, Rect};
pub use spec::{IconRef, MarkerId, MarkerOptions, MarkerSpec, Variant};
