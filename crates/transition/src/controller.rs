//! Steady-state marker management.
//!
//! [`MarkersController`] is what the host calls when its marker set
//! changes. It builds images, places and removes instances, and decides
//! whether a content change animates or is applied directly.

use std::time::Instant;
use tracing::{debug, info};

use crate::animator::{Scene, TransitionAnimator, TransitionPhase};
use crate::fade::FadeSet;
use crate::registry::MarkerRegistry;
use crate::surface::{DisplayMetrics, InstanceHandle, MapSurface};
use marker_common::{MarkerConfig, MarkerError, MarkerId, MarkerOptions, MarkerResult, TransitionConfig};
use renderer::MarkerBuilder;

/// How [`MarkersController::change_marker`] applied a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Replaced in one step with a freshly built image.
    Rebuilt,
    /// A transition is now running.
    Transitioning,
}

pub struct MarkersController<S: MapSurface> {
    builder: MarkerBuilder,
    surface: S,
    registry: MarkerRegistry,
    animator: TransitionAnimator,
    fades: FadeSet,
    config: TransitionConfig,
    refresh_hz: f32,
}

impl<S: MapSurface> MarkersController<S> {
    pub fn new(
        builder: MarkerBuilder,
        surface: S,
        config: TransitionConfig,
        display: &dyn DisplayMetrics,
    ) -> Self {
        Self {
            builder,
            surface,
            registry: MarkerRegistry::new(),
            animator: TransitionAnimator::new(config.clone()),
            fades: FadeSet::new(config.fade_duration()),
            config,
            refresh_hz: display.refresh_rate_hz(),
        }
    }

    /// Controller using the configured font and the display's density.
    pub fn from_config(
        config: &MarkerConfig,
        surface: S,
        display: &dyn DisplayMetrics,
    ) -> MarkerResult<Self> {
        config.validate()?;
        let builder = MarkerBuilder::from_config(config, display.density())?;
        Ok(Self::new(builder, surface, config.transition.clone(), display))
    }

    /// Build, place and register a new marker.
    pub fn add_marker(&mut self, options: MarkerOptions, now: Instant) -> MarkerResult<InstanceHandle> {
        if self.registry.contains(&options.id) {
            return Err(MarkerError::DuplicateMarker(options.id.to_string()));
        }

        let image = self.builder.build(&options.spec)?;
        let handle = self
            .surface
            .place_marker_instance(&image, options.z_index, &options.position)?;
        self.registry.register(&options, handle)?;

        if self.config.fades_enabled {
            self.fades.fade_in(&mut self.surface, handle, now);
        }
        debug!(marker = %options.id, instance = %handle, "Added marker");
        Ok(handle)
    }

    /// Apply new options to an existing marker.
    ///
    /// Any transition in flight for the marker settles first. Content
    /// changes animate when `options.animate` is set and the placement is
    /// unchanged; everything else, including an identical spec, is a
    /// direct rebuild.
    pub fn change_marker(&mut self, options: MarkerOptions, now: Instant) -> MarkerResult<ChangeOutcome> {
        if !self.registry.contains(&options.id) {
            return Err(MarkerError::UnknownMarker(options.id.to_string()));
        }

        let mut scene = Scene {
            builder: &mut self.builder,
            surface: &mut self.surface,
            registry: &mut self.registry,
        };
        self.animator.finish(&mut scene, &options.id);

        let entry = self.registry.get(&options.id)?;
        if let Some(current) = entry.instance() {
            self.fades.complete(&mut self.surface, current);
        }

        let entry = self.registry.get(&options.id)?;
        let same_placement = entry.position == options.position && entry.z_index == options.z_index;
        let animate = options.animate && same_placement && entry.spec != options.spec;

        if animate {
            let mut scene = Scene {
                builder: &mut self.builder,
                surface: &mut self.surface,
                registry: &mut self.registry,
            };
            if self
                .animator
                .begin(&mut scene, &options.id, options.spec.clone(), self.refresh_hz, now)?
            {
                return Ok(ChangeOutcome::Transitioning);
            }
        }

        self.rebuild(&options)?;
        Ok(ChangeOutcome::Rebuilt)
    }

    /// Place a fresh instance for `options`, then drop the old one.
    fn rebuild(&mut self, options: &MarkerOptions) -> MarkerResult<()> {
        let image = self.builder.build(&options.spec)?;
        let handle = self
            .surface
            .place_marker_instance(&image, options.z_index, &options.position)?;
        let previous = self.registry.rebind(options, handle)?;
        self.surface.remove_marker_instance(previous);
        debug!(marker = %options.id, instance = %handle, replaced = %previous, "Rebuilt marker");
        Ok(())
    }

    /// Remove a marker, settling any transition first.
    pub fn remove_marker(&mut self, id: &MarkerId, now: Instant) -> MarkerResult<()> {
        if !self.registry.contains(id) {
            return Err(MarkerError::UnknownMarker(id.to_string()));
        }

        let mut scene = Scene {
            builder: &mut self.builder,
            surface: &mut self.surface,
            registry: &mut self.registry,
        };
        self.animator.finish(&mut scene, id);

        let entry = self.registry.unregister(id)?;
        if let Some(handle) = entry.instance() {
            if self.config.fades_enabled {
                self.fades.fade_out(handle, now);
            } else {
                self.fades.complete(&mut self.surface, handle);
                self.surface.remove_marker_instance(handle);
            }
        }
        debug!(marker = %id, "Removed marker");
        Ok(())
    }

    /// Advance transitions and fades to `now`.
    pub fn tick(&mut self, now: Instant) {
        let mut scene = Scene {
            builder: &mut self.builder,
            surface: &mut self.surface,
            registry: &mut self.registry,
        };
        self.animator.tick(&mut scene, now);
        self.fades.tick(&mut self.surface, now);
    }

    /// Settle every running transition and fade immediately.
    pub fn finish_all(&mut self) {
        let mut scene = Scene {
            builder: &mut self.builder,
            surface: &mut self.surface,
            registry: &mut self.registry,
        };
        self.animator.finish_all(&mut scene);
        info!(markers = self.registry.len(), "Finished all transitions");
    }

    /// Logical marker for a native instance, including transition frames.
    pub fn marker_for_instance(&self, handle: InstanceHandle) -> Option<&MarkerId> {
        self.registry.marker_for_instance(handle)
    }

    pub fn transition_phase(&self, id: &MarkerId) -> Option<TransitionPhase> {
        self.animator.phase(id)
    }

    pub fn is_busy(&self) -> bool {
        self.animator.active_count() > 0 || !self.fades.is_empty()
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn animator(&self) -> &TransitionAnimator {
        &self.animator
    }

    pub fn builder(&self) -> &MarkerBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut MarkerBuilder {
        &mut self.builder
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
