//! Marker placement and animated transitions on a map surface.
//!
//! The map itself is external: everything here talks to it through the
//! [`MapSurface`] trait. [`MarkersController`] is the steady-state entry
//! point; it owns the [`MarkerRegistry`] and hands markers to the
//! [`TransitionAnimator`] while their content changes.

pub mod animator;
pub mod controller;
pub mod easing;
pub mod fade;
pub mod queue;
pub mod registry;
pub mod surface;

pub use animator::{Scene, TransitionAnimator, TransitionPhase};
pub use controller::{ChangeOutcome, MarkersController};
pub use easing::{ease_out_cubic, transition_steps};
pub use fade::FadeSet;
pub use queue::{Direction, FrameQueue, QueuedInstance};
pub use registry::{Binding, MarkerEntry, MarkerRegistry};
pub use surface::{
    DisplayMetrics, FixedDisplay, InstanceHandle, LiveInstance, MapSurface, MemorySurface,
    SurfaceEvent,
};
