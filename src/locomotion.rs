//! Locomotion force model.
//!
//! Pure per-tick force math: kick propulsion with stall attenuation,
//! slope-stick, quadratic drag, velocity decay, brake, jump, and the hard
//! speed cap. The systems layer feeds these from controller state and hands
//! the results to the physics backend.

use bevy::prelude::*;

use crate::config::{JumpStyle, SkateConfig, StallModel};

/// Kick acceleration magnitude for the current speed: full push-off power
/// below `free_roll_speed`, the smaller fast value above it.
pub fn kick_accel(speed: f32, config: &SkateConfig) -> f32 {
    if speed > config.free_roll_speed {
        config.kick_accel_fast
    } else {
        config.kick_accel_start
    }
}

/// Climb-stall test: grounded on a slope steeper than the stall threshold,
/// moving upward, but slower than the minimum climb speed. You cannot pedal
/// fast enough uphill to make progress and should slide back.
pub fn is_climb_stalled(
    footed: bool,
    slope_angle: f32,
    upward_speed: f32,
    speed: f32,
    config: &SkateConfig,
) -> bool {
    footed
        && slope_angle.abs() > config.stall_slope
        && upward_speed > 0.0
        && speed < config.min_vert_speed
}

/// Kick attenuation factor for the tick.
///
/// Zero while climb-stalled or wall-stalled. Under
/// [`StallModel::CosineSquared`] the hard climb cutoff is replaced by a
/// continuous cos²(slope) falloff (full power flat, zero at vertical);
/// wall-stall still zeroes the kick outright.
pub fn stall_factor(
    climb_stalled: bool,
    wall_stalled: bool,
    slope_angle: f32,
    config: &SkateConfig,
) -> f32 {
    if wall_stalled {
        return 0.0;
    }
    match config.stall_model {
        StallModel::HardCutoff => {
            if climb_stalled {
                0.0
            } else {
                1.0
            }
        }
        StallModel::CosineSquared => {
            let cos = slope_angle.cos();
            cos * cos
        }
    }
}

/// Quadratic aerodynamic drag: a deceleration opposing velocity,
/// proportional to speed², engaged only above `free_roll_speed`. Caps top
/// speed asymptotically.
pub fn quadratic_drag(velocity: Vec2, config: &SkateConfig) -> Vec2 {
    let speed = velocity.length();
    if speed <= config.free_roll_speed {
        return Vec2::ZERO;
    }
    let direction = velocity.normalize_or_zero();
    if direction == Vec2::ZERO {
        return Vec2::ZERO;
    }
    -direction * config.drag_coeff * speed * speed
}

/// Per-tick multiplicative decay coefficient for the current context:
/// near-zero while carving a real slope (ramps preserve momentum), higher on
/// flat ground and in air.
pub fn decay_coeff(footed: bool, carving: bool, config: &SkateConfig) -> f32 {
    if !footed {
        config.air_decay
    } else if carving {
        config.carve_decay
    } else {
        config.flat_decay
    }
}

/// Apply a multiplicative velocity decay (the `1 - drag` model).
pub fn apply_decay(velocity: Vec2, coeff: f32) -> Vec2 {
    velocity * (1.0 - coeff.clamp(0.0, 1.0))
}

/// Brake for one tick: scale velocity toward zero by the brake factor.
pub fn brake(velocity: Vec2, factor: f32) -> Vec2 {
    velocity * factor.clamp(0.0, 1.0)
}

/// Rescale velocity down to the hard cap, preserving direction.
pub fn cap_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    let speed = velocity.length();
    if speed <= max_speed || speed == 0.0 {
        return velocity;
    }
    velocity * (max_speed / speed)
}

/// Jump direction for the configured style.
pub fn jump_direction(smoothed_normal: Vec2, style: JumpStyle) -> Vec2 {
    match style {
        JumpStyle::SurfaceNormal => {
            let normal = smoothed_normal.normalize_or_zero();
            if normal == Vec2::ZERO {
                Vec2::Y
            } else {
                normal
            }
        }
        JumpStyle::WorldUp => Vec2::Y,
    }
}

/// Post-jump velocity: the component along the jump direction is zeroed
/// first so jump height is consistent regardless of the current normal-axis
/// speed, then the jump speed is added along the direction.
pub fn jump_velocity(velocity: Vec2, direction: Vec2, jump_speed: f32) -> Vec2 {
    let along = velocity.dot(direction);
    velocity - direction * along + direction * jump_speed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SkateConfig {
        SkateConfig::default()
    }

    // ==================== kick ====================

    #[test]
    fn kick_is_strong_below_free_roll() {
        let cfg = config();
        assert_eq!(kick_accel(0.0, &cfg), cfg.kick_accel_start);
        assert_eq!(kick_accel(cfg.free_roll_speed, &cfg), cfg.kick_accel_start);
        assert_eq!(
            kick_accel(cfg.free_roll_speed + 1.0, &cfg),
            cfg.kick_accel_fast
        );
    }

    // ==================== climb stall ====================

    #[test]
    fn climbing_steep_slope_too_slow_stalls() {
        let cfg = config();
        assert!(is_climb_stalled(true, 1.0, 50.0, 80.0, &cfg));
    }

    #[test]
    fn fast_climb_does_not_stall() {
        let cfg = config();
        assert!(!is_climb_stalled(
            true,
            1.0,
            200.0,
            cfg.min_vert_speed + 50.0,
            &cfg
        ));
    }

    #[test]
    fn descending_never_stalls() {
        let cfg = config();
        assert!(!is_climb_stalled(true, 1.0, -50.0, 80.0, &cfg));
    }

    #[test]
    fn shallow_slope_never_stalls() {
        let cfg = config();
        assert!(!is_climb_stalled(true, cfg.stall_slope * 0.5, 50.0, 80.0, &cfg));
    }

    #[test]
    fn airborne_never_climb_stalls() {
        let cfg = config();
        assert!(!is_climb_stalled(false, 1.0, 50.0, 80.0, &cfg));
    }

    // ==================== stall factor ====================

    #[test]
    fn hard_cutoff_zeroes_kick_exactly() {
        let cfg = config();
        assert_eq!(stall_factor(true, false, 1.0, &cfg), 0.0);
        assert_eq!(stall_factor(false, false, 1.0, &cfg), 1.0);
    }

    #[test]
    fn wall_stall_zeroes_kick_under_both_models() {
        let mut cfg = config();
        assert_eq!(stall_factor(false, true, 0.0, &cfg), 0.0);
        cfg.stall_model = StallModel::CosineSquared;
        assert_eq!(stall_factor(false, true, 0.0, &cfg), 0.0);
    }

    #[test]
    fn cosine_squared_fades_with_slope() {
        let mut cfg = config();
        cfg.stall_model = StallModel::CosineSquared;

        assert!((stall_factor(false, false, 0.0, &cfg) - 1.0).abs() < 1e-6);
        let at_60_deg = stall_factor(false, false, std::f32::consts::FRAC_PI_3, &cfg);
        assert!((at_60_deg - 0.25).abs() < 1e-5);
        let at_vertical = stall_factor(false, false, std::f32::consts::FRAC_PI_2, &cfg);
        assert!(at_vertical.abs() < 1e-6);
    }

    // ==================== drag & decay ====================

    #[test]
    fn no_drag_below_free_roll_speed() {
        let cfg = config();
        let drag = quadratic_drag(Vec2::new(cfg.free_roll_speed * 0.5, 0.0), &cfg);
        assert_eq!(drag, Vec2::ZERO);
    }

    #[test]
    fn drag_opposes_velocity_quadratically() {
        let cfg = config();
        let v = Vec2::new(400.0, 0.0);
        let drag = quadratic_drag(v, &cfg);
        assert!(drag.x < 0.0);
        assert_eq!(drag.y, 0.0);
        assert!((drag.length() - cfg.drag_coeff * 400.0 * 400.0).abs() < 1e-3);

        // Double the speed, four times the drag.
        let drag2 = quadratic_drag(v * 2.0, &cfg);
        assert!((drag2.length() / drag.length() - 4.0).abs() < 1e-3);
    }

    #[test]
    fn carving_decays_least() {
        let cfg = config();
        let carve = decay_coeff(true, true, &cfg);
        let flat = decay_coeff(true, false, &cfg);
        let air = decay_coeff(false, false, &cfg);
        assert!(carve < flat);
        assert!(carve < air);
    }

    #[test]
    fn decay_shrinks_velocity() {
        let v = apply_decay(Vec2::new(100.0, -50.0), 0.02);
        assert!((v - Vec2::new(98.0, -49.0)).length() < 1e-4);
    }

    // ==================== brake & cap ====================

    #[test]
    fn brake_scales_velocity() {
        let v = brake(Vec2::new(200.0, 0.0), 0.9);
        assert!((v.x - 180.0).abs() < 1e-4);
    }

    #[test]
    fn cap_preserves_direction() {
        let v = Vec2::new(300.0, 400.0); // length 500
        let capped = cap_speed(v, 100.0);
        assert!((capped.length() - 100.0).abs() < 1e-3);
        let dir_before = v.normalize();
        let dir_after = capped.normalize();
        assert!((dir_before - dir_after).length() < 1e-5);
    }

    #[test]
    fn cap_leaves_slow_velocities_alone() {
        let v = Vec2::new(50.0, 20.0);
        assert_eq!(cap_speed(v, 600.0), v);
        assert_eq!(cap_speed(Vec2::ZERO, 600.0), Vec2::ZERO);
    }

    // ==================== jump ====================

    #[test]
    fn jump_from_rest_reaches_exact_speed() {
        let v = jump_velocity(Vec2::ZERO, Vec2::Y, 350.0);
        assert_eq!(v, Vec2::new(0.0, 350.0));
    }

    #[test]
    fn jump_speed_is_independent_of_tangential_speed() {
        let direction = Vec2::Y;
        for vx in [0.0, 100.0, -250.0, 599.0] {
            let v = jump_velocity(Vec2::new(vx, 0.0), direction, 350.0);
            assert!((v.dot(direction) - 350.0).abs() < 1e-4);
            assert_eq!(v.x, vx);
        }
    }

    #[test]
    fn jump_zeroes_prior_normal_axis_velocity() {
        // Falling fast at jump time: height must not be eaten by it.
        let v = jump_velocity(Vec2::new(50.0, -400.0), Vec2::Y, 350.0);
        assert!((v.y - 350.0).abs() < 1e-4);

        // Already rising: not stacked either.
        let v = jump_velocity(Vec2::new(50.0, 200.0), Vec2::Y, 350.0);
        assert!((v.y - 350.0).abs() < 1e-4);
    }

    #[test]
    fn jump_along_ramp_normal() {
        let normal = Vec2::new(-0.6, 0.8);
        let v = jump_velocity(Vec2::ZERO, normal, 350.0);
        assert!((v.dot(normal) - 350.0).abs() < 1e-3);
    }

    #[test]
    fn jump_direction_guards_degenerate_normal() {
        assert_eq!(jump_direction(Vec2::ZERO, JumpStyle::SurfaceNormal), Vec2::Y);
        assert_eq!(
            jump_direction(Vec2::new(-0.6, 0.8), JumpStyle::WorldUp),
            Vec2::Y
        );
    }
}
