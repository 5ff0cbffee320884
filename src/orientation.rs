//! Orientation filtering.
//!
//! Raw surface normals and velocity-derived slope angles are noisy: grazing
//! multi-contact ticks, near-zero velocity, and fakie riding all produce
//! single-frame outliers. The filters here turn those into a stable rotation
//! for both visuals and force computation.

use bevy::prelude::*;

/// Bounded FIFO of recent raw slope-angle samples.
///
/// The published lean angle is the running mean, which damps single-frame
/// outliers. Oldest samples are evicted first once the buffer is full.
#[derive(Reflect, Debug, Clone, Default)]
pub struct LeanBuffer {
    samples: Vec<f32>,
    capacity: usize,
}

impl LeanBuffer {
    /// Create a buffer holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Push a raw sample, evicting the oldest if the buffer is full.
    pub fn push(&mut self, raw: f32) {
        if self.samples.len() == self.capacity {
            self.samples.remove(0);
        }
        self.samples.push(raw);
    }

    /// Running mean of the buffered samples, or `None` when empty.
    pub fn mean(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f32>() / self.samples.len() as f32)
    }

    /// Drop all samples (airborne transition, stall).
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Fold an angle beyond ±90° back into range (fakie correction).
///
/// Rolling backwards produces velocity angles near ±180°; the board still
/// leans with the slope, so the angle is mirrored into the front half.
pub fn fold_fakie(angle: f32) -> f32 {
    if angle > std::f32::consts::FRAC_PI_2 {
        angle - std::f32::consts::PI
    } else if angle < -std::f32::consts::FRAC_PI_2 {
        angle + std::f32::consts::PI
    } else {
        angle
    }
}

/// Fold a raw sample by ±180° when it sits more than `threshold` radians from
/// the running mean (wrap-around continuity correction).
pub fn fold_continuity(raw: f32, mean: f32, threshold: f32) -> f32 {
    let diff = raw - mean;
    if diff > threshold {
        raw - std::f32::consts::PI
    } else if diff < -threshold {
        raw + std::f32::consts::PI
    } else {
        raw
    }
}

/// Advance `current` toward `target` along the shortest arc, moving at most
/// `max_step` radians. The visual rotation can never snap, even when the
/// underlying target jumps.
pub fn rotate_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let mut diff = target - current;
    while diff > std::f32::consts::PI {
        diff -= std::f32::consts::TAU;
    }
    while diff < -std::f32::consts::PI {
        diff += std::f32::consts::TAU;
    }
    current + diff.clamp(-max_step.abs(), max_step.abs())
}

/// Blend a unit normal toward a target normal by `factor` and renormalize.
///
/// An exponential moving average, not a snap. Degenerate intermediate vectors
/// (opposed normals cancelling out) fall back to the current value so the
/// output is always finite and unit-length.
pub fn blend_normal(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    let blended = (current.lerp(target, factor.clamp(0.0, 1.0))).normalize_or_zero();
    if blended == Vec2::ZERO {
        current
    } else {
        blended
    }
}

/// Slope angle of a surface normal, in radians. Zero for flat ground
/// (normal straight up), ±π/2 for a vertical wall.
pub fn normal_to_slope(normal: Vec2) -> f32 {
    normal.x.atan2(normal.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    // ==================== LeanBuffer ====================

    #[test]
    fn buffer_never_exceeds_capacity() {
        let mut buffer = LeanBuffer::new(5);
        for i in 0..20 {
            buffer.push(i as f32);
            assert!(buffer.len() <= 5);
        }
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn buffer_evicts_oldest_first() {
        let mut buffer = LeanBuffer::new(3);
        buffer.push(1.0);
        buffer.push(2.0);
        buffer.push(3.0);
        buffer.push(4.0);
        // 1.0 was evicted: mean of [2, 3, 4] = 3.
        assert!((buffer.mean().unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn empty_buffer_has_no_mean() {
        let buffer = LeanBuffer::new(5);
        assert_eq!(buffer.mean(), None);
    }

    #[test]
    fn clear_empties_buffer() {
        let mut buffer = LeanBuffer::new(5);
        buffer.push(0.5);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.mean(), None);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buffer = LeanBuffer::new(0);
        buffer.push(1.0);
        assert_eq!(buffer.len(), 1);
    }

    // ==================== Folds ====================

    #[test]
    fn fakie_fold_leaves_forward_angles_alone() {
        assert_eq!(fold_fakie(0.3), 0.3);
        assert_eq!(fold_fakie(-1.2), -1.2);
    }

    #[test]
    fn fakie_fold_mirrors_backward_angles() {
        let folded = fold_fakie(PI - 0.1);
        assert!((folded - (-0.1)).abs() < 1e-6);

        let folded = fold_fakie(-PI + 0.2);
        assert!((folded - 0.2).abs() < 1e-6);
    }

    #[test]
    fn continuity_fold_only_triggers_past_threshold() {
        // Close to the mean: untouched.
        assert_eq!(fold_continuity(0.5, 0.3, 2.0), 0.5);

        // Way above the mean: folded down by PI.
        let folded = fold_continuity(2.5, 0.0, 2.0);
        assert!((folded - (2.5 - PI)).abs() < 1e-6);

        // Way below: folded up.
        let folded = fold_continuity(-2.5, 0.0, 2.0);
        assert!((folded - (-2.5 + PI)).abs() < 1e-6);
    }

    // ==================== rotate_toward ====================

    #[test]
    fn rotate_toward_is_bounded() {
        let next = rotate_toward(0.0, 1.0, 0.15);
        assert!((next - 0.15).abs() < 1e-6);
    }

    #[test]
    fn rotate_toward_reaches_close_targets() {
        let next = rotate_toward(0.0, 0.05, 0.15);
        assert!((next - 0.05).abs() < 1e-6);
    }

    #[test]
    fn rotate_toward_takes_shortest_arc() {
        // From just below +PI to just above -PI: step should go up through PI,
        // not all the way around.
        let next = rotate_toward(PI - 0.05, -PI + 0.05, 0.2);
        assert!(next > PI - 0.05);
    }

    #[test]
    fn rotate_toward_converges() {
        let mut angle = 0.0;
        for _ in 0..100 {
            angle = rotate_toward(angle, FRAC_PI_4, 0.15);
        }
        assert!((angle - FRAC_PI_4).abs() < 1e-4);
    }

    // ==================== blend_normal ====================

    #[test]
    fn blend_normal_moves_toward_target() {
        let blended = blend_normal(Vec2::Y, Vec2::X, 0.15);
        assert!(blended.x > 0.0);
        assert!((blended.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn blend_normal_survives_opposed_inputs() {
        // Halfway between Y and -Y is the zero vector; keep the old value.
        let blended = blend_normal(Vec2::Y, Vec2::NEG_Y, 0.5);
        assert_eq!(blended, Vec2::Y);
    }

    #[test]
    fn blend_full_factor_snaps_to_target() {
        let blended = blend_normal(Vec2::Y, Vec2::X, 1.0);
        assert!((blended - Vec2::X).length() < 1e-5);
    }

    // ==================== normal_to_slope ====================

    #[test]
    fn flat_ground_slope_is_zero() {
        assert_eq!(normal_to_slope(Vec2::Y), 0.0);
    }

    #[test]
    fn wall_slope_is_quarter_turn() {
        assert!((normal_to_slope(Vec2::X) - FRAC_PI_2).abs() < 1e-6);
        assert!((normal_to_slope(Vec2::NEG_X) + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn ramp_slope_matches_normal_tilt() {
        let normal = Vec2::new(-0.5, 0.866).normalize();
        let slope = normal_to_slope(normal);
        assert!((slope.abs() - 0.5236).abs() < 1e-3); // 30 degrees
    }
}
