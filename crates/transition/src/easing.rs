//! Easing curves for transition frames and fades.

/// Ease-out cubic: fast start, gentle landing. Input is clamped to [0, 1].
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Eased interpolation steps for frames `1..=frame_count`.
///
/// The last step is exactly 1.0.
pub fn transition_steps(frame_count: usize) -> Vec<f32> {
    (1..=frame_count)
        .map(|i| ease_out_cubic(i as f32 / frame_count as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(-3.0), 0.0);
        assert_eq!(ease_out_cubic(7.0), 1.0);
    }

    #[test]
    fn test_ease_out_runs_ahead_of_linear() {
        for i in 1..10 {
            let t = i as f32 / 10.0;
            assert!(ease_out_cubic(t) > t);
        }
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_steps_increase_to_one() {
        let steps = transition_steps(12);
        assert_eq!(steps.len(), 12);
        assert_eq!(*steps.last().unwrap(), 1.0);
        for pair in steps.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
