//! Collaborator traits for the external map surface and display.
//!
//! [`MemorySurface`] is an in-process implementation that records what a
//! real map would show. The preview CLI simulates transitions on it.

use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use marker_common::{LatLng, MarkerError, MarkerResult};
use renderer::RasterImage;

/// Native identifier of one marker instance on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceHandle(pub u64);

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Primitives the map surface provides for showing marker images.
pub trait MapSurface {
    /// Show `image` anchored at `position`. Higher z-index draws on top.
    fn place_marker_instance(
        &mut self,
        image: &RasterImage,
        z_index: f32,
        position: &LatLng,
    ) -> MarkerResult<InstanceHandle>;

    fn remove_marker_instance(&mut self, handle: InstanceHandle);

    fn set_instance_alpha(&mut self, handle: InstanceHandle, alpha: f32);
}

/// Environment queries used to size frame counts and scale layout.
pub trait DisplayMetrics {
    fn refresh_rate_hz(&self) -> f32;
    fn density(&self) -> f32;
}

/// Display with fixed characteristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDisplay {
    pub refresh_rate_hz: f32,
    pub density: f32,
}

impl Default for FixedDisplay {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60.0,
            density: 1.0,
        }
    }
}

impl DisplayMetrics for FixedDisplay {
    fn refresh_rate_hz(&self) -> f32 {
        self.refresh_rate_hz
    }

    fn density(&self) -> f32 {
        self.density
    }
}

/// Something that happened on a [`MemorySurface`], in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Placed {
        handle: InstanceHandle,
        z_index: f32,
        width: u32,
        height: u32,
    },
    Rejected,
    Removed(InstanceHandle),
    Alpha {
        handle: InstanceHandle,
        alpha: f32,
    },
}

#[derive(Debug, Clone)]
pub struct LiveInstance {
    pub image: RasterImage,
    pub z_index: f32,
    pub position: LatLng,
    pub alpha: f32,
}

/// In-memory map surface that records every call.
#[derive(Debug, Default)]
pub struct MemorySurface {
    next_handle: u64,
    live: BTreeMap<InstanceHandle, LiveInstance>,
    events: Vec<SurfaceEvent>,
    reject_remaining: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` placements.
    pub fn reject_next(&mut self, count: usize) {
        self.reject_remaining = count;
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn instance(&self, handle: InstanceHandle) -> Option<&LiveInstance> {
        self.live.get(&handle)
    }

    pub fn is_live(&self, handle: InstanceHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Live instances from bottom to top. Ties keep placement order.
    pub fn stacking_order(&self) -> Vec<InstanceHandle> {
        let mut handles: Vec<(InstanceHandle, f32)> =
            self.live.iter().map(|(h, i)| (*h, i.z_index)).collect();
        handles.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        handles.into_iter().map(|(h, _)| h).collect()
    }

    /// The instance a viewer would see on top.
    pub fn top(&self) -> Option<InstanceHandle> {
        self.stacking_order().last().copied()
    }

    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }
}

impl MapSurface for MemorySurface {
    fn place_marker_instance(
        &mut self,
        image: &RasterImage,
        z_index: f32,
        position: &LatLng,
    ) -> MarkerResult<InstanceHandle> {
        if self.reject_remaining > 0 {
            self.reject_remaining -= 1;
            self.events.push(SurfaceEvent::Rejected);
            return Err(MarkerError::SurfaceRejected(
                "memory surface told to reject".to_string(),
            ));
        }

        self.next_handle += 1;
        let handle = InstanceHandle(self.next_handle);
        debug!(%handle, z_index, width = image.width(), height = image.height(), "Placed instance");

        self.events.push(SurfaceEvent::Placed {
            handle,
            z_index,
            width: image.width(),
            height: image.height(),
        });
        self.live.insert(
            handle,
            LiveInstance {
                image: image.clone(),
                z_index,
                position: *position,
                alpha: 1.0,
            },
        );
        Ok(handle)
    }

    fn remove_marker_instance(&mut self, handle: InstanceHandle) {
        if self.live.remove(&handle).is_none() {
            warn!(%handle, "Removing unknown instance");
            return;
        }
        debug!(%handle, "Removed instance");
        self.events.push(SurfaceEvent::Removed(handle));
    }

    fn set_instance_alpha(&mut self, handle: InstanceHandle, alpha: f32) {
        if let Some(instance) = self.live.get_mut(&handle) {
            instance.alpha = alpha;
            self.events.push(SurfaceEvent::Alpha { handle, alpha });
        }
    }
}
