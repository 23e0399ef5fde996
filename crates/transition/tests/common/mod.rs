//! Common helpers for transition tests
//!
//! Provides:
//! - Builders and controllers on estimated text metrics
//! - A harness driving the animator directly
//! - Clock helpers

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use marker_common::{LatLng, MarkerConfig, MarkerId, MarkerOptions, MarkerSpec, TransitionConfig};
use renderer::{MarkerBuilder, SvgIconRenderer, Typeface};
use transition::{
    FixedDisplay, InstanceHandle, MapSurface, MarkerRegistry, MarkersController, MemorySurface,
    Scene, SurfaceEvent, TransitionAnimator,
};

/// Tick interval of a 60 Hz display, rounded down.
pub const TICK_MS: u64 = 16;

pub fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

pub fn builder() -> MarkerBuilder {
    MarkerBuilder::new(
        &MarkerConfig::default(),
        1.0,
        Arc::new(Typeface::estimated()),
        Box::new(SvgIconRenderer::default()),
    )
}

pub fn controller_with(config: TransitionConfig) -> MarkersController<MemorySurface> {
    MarkersController::new(builder(), MemorySurface::new(), config, &FixedDisplay::default())
}

pub fn controller() -> MarkersController<MemorySurface> {
    controller_with(TransitionConfig::default())
}

/// Tick every `TICK_MS` from `from_ms` through `to_ms` inclusive.
pub fn run_clock(controller: &mut MarkersController<MemorySurface>, t0: Instant, from_ms: u64, to_ms: u64) {
    let mut ms = from_ms;
    while ms < to_ms {
        controller.tick(at(t0, ms));
        ms += TICK_MS;
    }
    controller.tick(at(t0, to_ms));
}

/// Z-indices of every placement, in order.
pub fn placed_z(events: &[SurfaceEvent]) -> Vec<f32> {
    events
        .iter()
        .filter_map(|e| match e {
            SurfaceEvent::Placed { z_index, .. } => Some(*z_index),
            _ => None,
        })
        .collect()
}

pub fn count_rejected(events: &[SurfaceEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SurfaceEvent::Rejected))
        .count()
}

/// Animator with its collaborators, driven without a controller.
pub struct Harness {
    pub builder: MarkerBuilder,
    pub surface: MemorySurface,
    pub registry: MarkerRegistry,
    pub animator: TransitionAnimator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(TransitionConfig::default())
    }

    pub fn with_config(config: TransitionConfig) -> Self {
        Self {
            builder: builder(),
            surface: MemorySurface::new(),
            registry: MarkerRegistry::new(),
            animator: TransitionAnimator::new(config),
        }
    }

    /// Place and register a steady marker at z 0.
    pub fn add(&mut self, id: &str, spec: MarkerSpec) -> InstanceHandle {
        let image = self.builder.build(&spec).unwrap();
        let handle = self
            .surface
            .place_marker_instance(&image, 0.0, &LatLng::default())
            .unwrap();
        self.registry
            .register(&MarkerOptions::new(id, spec), handle)
            .unwrap();
        self.surface.take_events();
        handle
    }

    pub fn begin(&mut self, id: &str, end: MarkerSpec, refresh_hz: f32, now: Instant) -> bool {
        let mut scene = Scene {
            builder: &mut self.builder,
            surface: &mut self.surface,
            registry: &mut self.registry,
        };
        self.animator
            .begin(&mut scene, &MarkerId::from(id), end, refresh_hz, now)
            .unwrap()
    }

    pub fn tick(&mut self, now: Instant) {
        let mut scene = Scene {
            builder: &mut self.builder,
            surface: &mut self.surface,
            registry: &mut self.registry,
        };
        self.animator.tick(&mut scene, now);
    }

    pub fn finish(&mut self, id: &str) -> bool {
        let mut scene = Scene {
            builder: &mut self.builder,
            surface: &mut self.surface,
            registry: &mut self.registry,
        };
        self.animator.finish(&mut scene, &MarkerId::from(id))
    }
}
