//! Logical marker identities and the native instances that show them.
//!
//! A marker is either `Steady`, bound to exactly one instance, or
//! `Transitioning`, in which case the animator owns its instances until it
//! calls [`MarkerRegistry::settle`]. The native-instance map covers every
//! instance on the surface, including transition frames, so taps on any of
//! them resolve to the right marker.

use std::collections::{BTreeMap, HashMap};

use crate::surface::InstanceHandle;
use marker_common::{LatLng, MarkerError, MarkerId, MarkerOptions, MarkerResult, MarkerSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Steady(InstanceHandle),
    Transitioning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    /// Spec currently shown. Updated only when a transition settles.
    pub spec: MarkerSpec,
    pub position: LatLng,
    pub z_index: f32,
    pub binding: Binding,
}

impl MarkerEntry {
    pub fn instance(&self) -> Option<InstanceHandle> {
        match self.binding {
            Binding::Steady(handle) => Some(handle),
            Binding::Transitioning => None,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.binding == Binding::Transitioning
    }
}

#[derive(Debug, Default)]
pub struct MarkerRegistry {
    entries: BTreeMap<MarkerId, MarkerEntry>,
    instances: HashMap<InstanceHandle, MarkerId>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new marker shown by `handle`.
    pub fn register(&mut self, options: &MarkerOptions, handle: InstanceHandle) -> MarkerResult<()> {
        if self.entries.contains_key(&options.id) {
            return Err(MarkerError::DuplicateMarker(options.id.to_string()));
        }
        self.entries.insert(
            options.id.clone(),
            MarkerEntry {
                spec: options.spec.clone(),
                position: options.position,
                z_index: options.z_index,
                binding: Binding::Steady(handle),
            },
        );
        self.instances.insert(handle, options.id.clone());
        Ok(())
    }

    /// Remove a steady marker, returning its entry. Its instance is unbound.
    pub fn unregister(&mut self, id: &MarkerId) -> MarkerResult<MarkerEntry> {
        match self.entries.get(id) {
            None => return Err(MarkerError::UnknownMarker(id.to_string())),
            Some(entry) if entry.is_transitioning() => {
                return Err(MarkerError::TransitionInFlight(id.to_string()))
            }
            Some(_) => {}
        }
        let entry = self
            .entries
            .remove(id)
            .ok_or_else(|| MarkerError::UnknownMarker(id.to_string()))?;
        if let Some(handle) = entry.instance() {
            self.instances.remove(&handle);
        }
        Ok(entry)
    }

    pub fn get(&self, id: &MarkerId) -> MarkerResult<&MarkerEntry> {
        self.entries
            .get(id)
            .ok_or_else(|| MarkerError::UnknownMarker(id.to_string()))
    }

    pub fn contains(&self, id: &MarkerId) -> bool {
        self.entries.contains_key(id)
    }

    /// Give a steady marker's instance to the animator.
    pub fn hand_over(&mut self, id: &MarkerId) -> MarkerResult<InstanceHandle> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| MarkerError::UnknownMarker(id.to_string()))?;
        match entry.binding {
            Binding::Steady(handle) => {
                entry.binding = Binding::Transitioning;
                Ok(handle)
            }
            Binding::Transitioning => Err(MarkerError::TransitionInFlight(id.to_string())),
        }
    }

    /// End a transition: `handle` now shows `spec`.
    pub fn settle(&mut self, id: &MarkerId, handle: InstanceHandle, spec: MarkerSpec) -> MarkerResult<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| MarkerError::UnknownMarker(id.to_string()))?;
        entry.binding = Binding::Steady(handle);
        entry.spec = spec;
        self.instances.insert(handle, id.clone());
        Ok(())
    }

    /// Replace a steady marker's instance and placement without animating.
    ///
    /// Returns the previous instance, already unbound.
    pub fn rebind(&mut self, options: &MarkerOptions, handle: InstanceHandle) -> MarkerResult<InstanceHandle> {
        let entry = self
            .entries
            .get_mut(&options.id)
            .ok_or_else(|| MarkerError::UnknownMarker(options.id.to_string()))?;
        let Binding::Steady(previous) = entry.binding else {
            return Err(MarkerError::TransitionInFlight(options.id.to_string()));
        };

        entry.spec = options.spec.clone();
        entry.position = options.position;
        entry.z_index = options.z_index;
        entry.binding = Binding::Steady(handle);

        self.instances.remove(&previous);
        self.instances.insert(handle, options.id.clone());
        Ok(previous)
    }

    /// Record a transient instance (a transition frame) as showing `id`.
    pub fn bind_instance(&mut self, handle: InstanceHandle, id: &MarkerId) {
        self.instances.insert(handle, id.clone());
    }

    pub fn unbind_instance(&mut self, handle: InstanceHandle) {
        self.instances.remove(&handle);
    }

    /// Logical marker shown by a native instance.
    pub fn marker_for_instance(&self, handle: InstanceHandle) -> Option<&MarkerId> {
        self.instances.get(&handle)
    }

    pub fn ids(&self) -> impl Iterator<Item = &MarkerId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of native instances currently mapped to markers.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}
