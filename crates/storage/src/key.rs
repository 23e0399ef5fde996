//! Structural cache keys.

use marker_common::MarkerSpec;

/// Key identifying one rendered raster.
///
/// Keys compare and hash by the full structure of the specs involved, so two
/// different markers can never collide the way concatenated strings can.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Steady-state rendering of a single spec.
    Marker(MarkerSpec),
    /// One frame of a transition between two specs.
    Frame {
        start: MarkerSpec,
        end: MarkerSpec,
        /// Bit pattern of the (eased) interpolation step.
        step_bits: u32,
    },
}

impl CacheKey {
    pub fn marker(spec: &MarkerSpec) -> Self {
        CacheKey::Marker(spec.clone())
    }

    pub fn frame(start: &MarkerSpec, end: &MarkerSpec, step: f32) -> Self {
        // -0.0 and 0.0 render identically; keep them on one key.
        let step = if step == 0.0 { 0.0 } else { step };
        CacheKey::Frame {
            start: start.clone(),
            end: end.clone(),
            step_bits: step.to_bits(),
        }
    }

    /// The interpolation step for frame keys.
    pub fn step(&self) -> Option<f32> {
        match self {
            CacheKey::Marker(_) => None,
            CacheKey::Frame { step_bits, .. } => Some(f32::from_bits(*step_bits)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fields_that_concatenate_alike_do_not_collide() {
        // "ab" + "c" and "a" + "bc" concatenate to the same string.
        let a = CacheKey::frame(&MarkerSpec::new("ab"), &MarkerSpec::new("c"), 0.5);
        let b = CacheKey::frame(&MarkerSpec::new("a"), &MarkerSpec::new("bc"), 0.5);
        assert_ne!(a, b);
    }

    #[test]
    fn test_marker_and_frame_keys_are_distinct() {
        let spec = MarkerSpec::new("42");
        let mut keys = HashSet::new();
        keys.insert(CacheKey::marker(&spec));
        keys.insert(CacheKey::frame(&spec, &spec, 1.0));
        keys.insert(CacheKey::frame(&spec, &spec, 0.5));
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_negative_zero_step() {
        let spec = MarkerSpec::new("1");
        assert_eq!(
            CacheKey::frame(&spec, &spec, -0.0),
            CacheKey::frame(&spec, &spec, 0.0)
        );
        assert_eq!(CacheKey::frame(&spec, &spec, 0.25).step(), Some(0.25));
    }
}
