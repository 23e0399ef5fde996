//! Alpha fades for markers appearing and disappearing.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::easing::ease_out_cubic;
use crate::surface::{InstanceHandle, MapSurface};

#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f32,
    to: f32,
    started: Instant,
    /// Remove the instance from the surface once the fade completes.
    remove_after: bool,
}

impl Fade {
    fn alpha_at(&self, now: Instant, duration: Duration) -> (f32, bool) {
        let elapsed = now.saturating_duration_since(self.started);
        let t = if duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f32() / duration.as_secs_f32()
        };
        let eased = ease_out_cubic(t);
        (self.from + (self.to - self.from) * eased, t >= 1.0)
    }
}

/// In-flight fades keyed by instance.
#[derive(Debug)]
pub struct FadeSet {
    duration: Duration,
    fades: HashMap<InstanceHandle, Fade>,
}

impl FadeSet {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            fades: HashMap::new(),
        }
    }

    /// Start from alpha 0 and fade in to fully opaque.
    pub fn fade_in(&mut self, surface: &mut dyn MapSurface, handle: InstanceHandle, now: Instant) {
        surface.set_instance_alpha(handle, 0.0);
        self.fades.insert(
            handle,
            Fade {
                from: 0.0,
                to: 1.0,
                started: now,
                remove_after: false,
            },
        );
    }

    /// Fade to transparent, then remove the instance.
    pub fn fade_out(&mut self, handle: InstanceHandle, now: Instant) {
        let from = self
            .fades
            .get(&handle)
            .map(|f| f.alpha_at(now, self.duration).0)
            .unwrap_or(1.0);
        self.fades.insert(
            handle,
            Fade {
                from,
                to: 0.0,
                started: now,
                remove_after: true,
            },
        );
    }

    /// Jump a fade to its end state.
    pub fn complete(&mut self, surface: &mut dyn MapSurface, handle: InstanceHandle) {
        if let Some(fade) = self.fades.remove(&handle) {
            surface.set_instance_alpha(handle, fade.to);
            if fade.remove_after {
                surface.remove_marker_instance(handle);
            }
        }
    }

    /// Advance every fade; finished fade-outs remove their instances.
    pub fn tick(&mut self, surface: &mut dyn MapSurface, now: Instant) {
        let duration = self.duration;
        self.fades.retain(|&handle, fade| {
            let (alpha, done) = fade.alpha_at(now, duration);
            surface.set_instance_alpha(handle, alpha);
            if done && fade.remove_after {
                debug!(%handle, "Fade-out finished");
                surface.remove_marker_instance(handle);
            }
            !done
        });
    }

    pub fn is_fading(&self, handle: InstanceHandle) -> bool {
        self.fades.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.fades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fades.is_empty()
    }
}
