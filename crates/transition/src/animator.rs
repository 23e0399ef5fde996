//! Frame-sequenced marker transitions.
//!
//! A map surface can only show whole pre-rasterized images, so a content
//! change is played as a short sequence of interpolated frames, each shown
//! by its own instance. A transition runs through three phases:
//!
//! - **FramesBuilding**: every frame is rasterized up front at eased steps.
//!   Comparing the first and last frame areas decides the direction.
//! - **Animating**: each tick maps elapsed time to a frame index and, when
//!   the index advances, places the frame and retires the trailing one.
//! - **Settling**: the exact end image is placed at the marker's own
//!   z-index. After a grace delay every other instance is removed and the
//!   registry rebinds the marker to the survivor.
//!
//! Starting a transition for a marker that already has one in flight
//! settles the old one first, synchronously.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::easing::transition_steps;
use crate::queue::{Direction, FrameQueue};
use crate::registry::MarkerRegistry;
use crate::surface::{InstanceHandle, MapSurface};
use marker_common::{LatLng, MarkerId, MarkerResult, MarkerSpec, TransitionConfig};
use renderer::{MarkerBuilder, RasterImage};

/// Collaborators a transition acts on.
pub struct Scene<'a> {
    pub builder: &'a mut MarkerBuilder,
    pub surface: &'a mut dyn MapSurface,
    pub registry: &'a mut MarkerRegistry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    FramesBuilding,
    Animating,
    Settling,
}

struct TransitionRun {
    id: MarkerId,
    end: MarkerSpec,
    position: LatLng,
    base_z: f32,
    frames: Vec<RasterImage>,
    queue: FrameQueue,
    phase: TransitionPhase,
    started: Instant,
    settle_at: Option<Instant>,
    /// Latest frame index reached by the clock.
    shown_index: usize,
    /// Latest frame number handed to the surface, placed or not.
    placed_frame: usize,
    settled_instance: Option<InstanceHandle>,
}

impl TransitionRun {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Returns true once the run is finished.
    fn advance(
        &mut self,
        scene: &mut Scene<'_>,
        now: Instant,
        duration: Duration,
        settle_delay: Duration,
    ) -> bool {
        match self.phase {
            TransitionPhase::FramesBuilding | TransitionPhase::Animating => {
                let elapsed = now.saturating_duration_since(self.started);
                let t = if duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
                };
                let index = ((t * self.frame_count() as f32).floor() as usize).min(self.frame_count());
                if index > self.shown_index {
                    self.show(scene, index);
                }
                if t >= 1.0 {
                    self.place_settled(scene);
                    self.phase = TransitionPhase::Settling;
                    self.settle_at = Some(now + settle_delay);
                }
                false
            }
            TransitionPhase::Settling => match self.settle_at {
                Some(at) if now < at => false,
                _ => {
                    self.complete(scene);
                    true
                }
            },
        }
    }

    /// Advance the visible frame to `index`.
    fn show(&mut self, scene: &mut Scene<'_>, index: usize) {
        self.shown_index = index;
        match self.queue.direction() {
            Direction::Growing => {
                if index > self.placed_frame {
                    self.place_frame(scene, index);
                }
            }
            Direction::Shrinking => {
                // Placements run ahead of the visible frame by the pre-seed.
                let lead = index + self.queue.depth() - 1;
                if lead <= self.frame_count() && lead > self.placed_frame {
                    self.place_frame(scene, lead);
                }
            }
        }

        for handle in self.queue.retire_excess(index) {
            self.retire(scene, handle);
        }
        debug!(marker = %self.id, frame = index, live = self.queue.len(), "Advanced transition");
    }

    fn place_frame(&mut self, scene: &mut Scene<'_>, frame: usize) {
        self.placed_frame = frame;
        let Some(image) = frame.checked_sub(1).and_then(|i| self.frames.get(i)) else {
            return;
        };

        let z_index = self.queue.z_for(frame);
        match scene.surface.place_marker_instance(image, z_index, &self.position) {
            Ok(handle) => {
                scene.registry.bind_instance(handle, &self.id);
                self.queue.push(handle, frame);
            }
            Err(e) => {
                warn!(marker = %self.id, frame, error = %e, "Surface rejected transition frame; skipping");
            }
        }
    }

    /// Place the exact end-state image at the marker's own z-index.
    fn place_settled(&mut self, scene: &mut Scene<'_>) {
        if self.settled_instance.is_some() {
            return;
        }
        let image = match scene.builder.build(&self.end) {
            Ok(image) => image,
            Err(e) => {
                warn!(marker = %self.id, error = %e, "Failed to build settled marker");
                return;
            }
        };
        match scene.surface.place_marker_instance(&image, self.base_z, &self.position) {
            Ok(handle) => {
                scene.registry.bind_instance(handle, &self.id);
                self.settled_instance = Some(handle);
            }
            Err(e) => {
                warn!(marker = %self.id, error = %e, "Surface rejected settled marker; keeping last frame");
            }
        }
    }

    /// Retire everything but one instance and give the marker back to the
    /// registry.
    fn complete(&mut self, scene: &mut Scene<'_>) {
        let survivor = self
            .settled_instance
            .or_else(|| self.queue.newest().map(|q| q.handle));

        for handle in self.queue.drain() {
            if Some(handle) != survivor {
                self.retire(scene, handle);
            }
        }

        match survivor {
            Some(handle) => {
                if let Err(e) = scene.registry.settle(&self.id, handle, self.end.clone()) {
                    warn!(marker = %self.id, error = %e, "Settled transition for unregistered marker");
                    scene.surface.remove_marker_instance(handle);
                    scene.registry.unbind_instance(handle);
                    return;
                }
                info!(marker = %self.id, instance = %handle, "Transition settled");
            }
            None => warn!(marker = %self.id, "Transition ended without a live instance"),
        }
    }

    fn retire(&self, scene: &mut Scene<'_>, handle: InstanceHandle) {
        scene.surface.remove_marker_instance(handle);
        scene.registry.unbind_instance(handle);
    }
}

/// Drives every in-flight transition.
pub struct TransitionAnimator {
    config: TransitionConfig,
    runs: BTreeMap<MarkerId, TransitionRun>,
}

impl TransitionAnimator {
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            runs: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Start transitioning marker `id` from its registered spec to `end`.
    ///
    /// Any transition already running for `id` is settled first. Returns
    /// `Ok(false)` without touching the surface when `end` equals the
    /// current spec.
    pub fn begin(
        &mut self,
        scene: &mut Scene<'_>,
        id: &MarkerId,
        end: MarkerSpec,
        refresh_hz: f32,
        now: Instant,
    ) -> MarkerResult<bool> {
        self.finish(scene, id);

        let entry = scene.registry.get(id)?;
        if entry.spec == end {
            return Ok(false);
        }
        let start = entry.spec.clone();
        let (position, base_z) = (entry.position, entry.z_index);

        let frame_count = self.config.frame_count(refresh_hz);
        debug!(marker = %id, frame_count, phase = ?TransitionPhase::FramesBuilding, "Building transition frames");
        let frames = scene
            .builder
            .build_transition_frames(&start, &end, &transition_steps(frame_count))?;
        let direction = match (frames.first(), frames.last()) {
            (Some(first), Some(last)) => Direction::classify(first.area(), last.area()),
            _ => return Ok(false),
        };

        let original = scene.registry.hand_over(id)?;
        let queue = FrameQueue::new(
            original,
            direction,
            self.config.queue_depth,
            base_z,
            self.config.z_span,
            frame_count,
        );
        let mut run = TransitionRun {
            id: id.clone(),
            end,
            position,
            base_z,
            frames,
            queue,
            phase: TransitionPhase::Animating,
            started: now,
            settle_at: None,
            shown_index: 0,
            placed_frame: 0,
            settled_instance: None,
        };

        // A shrinking marker gets cover underneath before the clock starts.
        if direction == Direction::Shrinking {
            let seed = self.config.queue_depth.saturating_sub(1).min(frame_count);
            for frame in 1..=seed {
                run.place_frame(scene, frame);
            }
        }

        info!(
            marker = %id,
            from = %start.label,
            to = %run.end.label,
            ?direction,
            frame_count,
            "Transition started"
        );
        self.runs.insert(id.clone(), run);
        Ok(true)
    }

    /// Advance every transition to `now`.
    pub fn tick(&mut self, scene: &mut Scene<'_>, now: Instant) {
        let duration = self.config.duration();
        let settle_delay = self.config.settle_delay();
        self.runs
            .retain(|_, run| !run.advance(scene, now, duration, settle_delay));
    }

    /// Force the transition for `id`, if any, to its settled state now.
    pub fn finish(&mut self, scene: &mut Scene<'_>, id: &MarkerId) -> bool {
        let Some(mut run) = self.runs.remove(id) else {
            return false;
        };
        debug!(marker = %id, phase = ?run.phase, "Forcing transition to settle");
        run.place_settled(scene);
        run.complete(scene);
        true
    }

    pub fn finish_all(&mut self, scene: &mut Scene<'_>) {
        let ids: Vec<MarkerId> = self.runs.keys().cloned().collect();
        for id in ids {
            self.finish(scene, &id);
        }
    }

    /// Phase of the transition for `id`; `None` when idle.
    pub fn phase(&self, id: &MarkerId) -> Option<TransitionPhase> {
        self.runs.get(id).map(|run| run.phase)
    }

    pub fn direction(&self, id: &MarkerId) -> Option<Direction> {
        self.runs.get(id).map(|run| run.queue.direction())
    }

    pub fn frame_count(&self, id: &MarkerId) -> Option<usize> {
        self.runs.get(id).map(|run| run.frame_count())
    }

    pub fn is_animating(&self, id: &MarkerId) -> bool {
        self.runs.contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.runs.len()
    }
}
