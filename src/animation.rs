//! Animation intent.
//!
//! The controller does not drive sprites directly. Each tick it resolves a
//! single [`AnimationKey`] from physics state plus movement intent; the
//! rendering layer maps keys onto whatever clips it has. Priority when
//! several apply: airborne, then brake, then an in-flight kick, then
//! pump/idle by speed.

use bevy::prelude::*;

use crate::config::SkateConfig;
use crate::controller::SkateController;
use crate::intent::SkateIntent;

/// Coarse animation state the renderer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AnimationKey {
    /// Standing on the board, essentially stationary.
    #[default]
    Idle,
    /// Rolling along a surface.
    Pump,
    /// Push-off, plays to completion once started.
    Kick,
    /// Off the ground.
    Airborne,
    /// Foot down, scrubbing speed.
    Brake,
}

/// Resolved animation state for a skater, refreshed every fixed tick.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AnimationIntent {
    pub key: AnimationKey,
    /// Remaining ticks of an in-flight kick clip.
    kick_ticks_left: u32,
}

impl AnimationIntent {
    /// True while a kick clip still has ticks to play.
    pub fn kicking(&self) -> bool {
        self.kick_ticks_left > 0
    }

    /// Resolve the key for this tick.
    pub fn update(
        &mut self,
        controller: &SkateController,
        intent: &SkateIntent,
        velocity: Vec2,
        config: &SkateConfig,
    ) {
        self.kick_ticks_left = self.kick_ticks_left.saturating_sub(1);

        if self.airborne(controller, velocity, config) {
            // Leaving the ground cancels a kick clip.
            self.kick_ticks_left = 0;
            self.key = AnimationKey::Airborne;
            return;
        }

        if intent.drop && controller.has_footing() {
            self.kick_ticks_left = 0;
            self.key = AnimationKey::Brake;
            return;
        }

        if self.kick_starts(controller, intent, velocity, config) {
            self.kick_ticks_left = config.kick_anim_ticks;
        }
        if self.kicking() {
            self.key = AnimationKey::Kick;
            return;
        }

        self.key = if velocity.length() > config.idle_speed {
            AnimationKey::Pump
        } else {
            AnimationKey::Idle
        };
    }

    /// Airborne display is debounced: brief ground gaps (rolling over a seam)
    /// keep the rolling pose. A strong launch or a fast fall shows
    /// immediately.
    fn airborne(&self, controller: &SkateController, velocity: Vec2, config: &SkateConfig) -> bool {
        if controller.has_footing() {
            return false;
        }
        if velocity.y > config.strong_rise_speed || velocity.y < -config.fast_fall_speed {
            return true;
        }
        controller.air_frames > config.air_anim_delay
    }

    fn kick_starts(
        &self,
        controller: &SkateController,
        intent: &SkateIntent,
        velocity: Vec2,
        config: &SkateConfig,
    ) -> bool {
        intent.steer_just_pressed()
            && !controller.stalled
            && !controller.wall_stalled
            && velocity.length() < config.kick_anim_max_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SkateConfig, SkateController, SkateIntent, AnimationIntent) {
        let config = SkateConfig::default();
        let controller = SkateController::new(&config);
        (config, controller, SkateIntent::default(), AnimationIntent::default())
    }

    fn ground(controller: &mut SkateController, config: &SkateConfig) {
        controller.ground_timer = config.coyote_ticks;
        controller.air_frames = 0;
    }

    #[test]
    fn idle_when_slow_and_grounded() {
        let (config, mut controller, intent, mut anim) = setup();
        ground(&mut controller, &config);
        anim.update(&controller, &intent, Vec2::new(10.0, 0.0), &config);
        assert_eq!(anim.key, AnimationKey::Idle);
    }

    #[test]
    fn pump_when_rolling() {
        let (config, mut controller, intent, mut anim) = setup();
        ground(&mut controller, &config);
        anim.update(&controller, &intent, Vec2::new(200.0, 0.0), &config);
        assert_eq!(anim.key, AnimationKey::Pump);
    }

    #[test]
    fn kick_plays_to_completion() {
        let (config, mut controller, mut intent, mut anim) = setup();
        ground(&mut controller, &config);
        intent.set_steer(1.0);
        anim.update(&controller, &intent, Vec2::new(100.0, 0.0), &config);
        assert_eq!(anim.key, AnimationKey::Kick);
        intent.settle();

        // Steer held, no new edge: the clip keeps playing.
        for _ in 1..config.kick_anim_ticks {
            anim.update(&controller, &intent, Vec2::new(100.0, 0.0), &config);
            assert_eq!(anim.key, AnimationKey::Kick);
        }
        anim.update(&controller, &intent, Vec2::new(100.0, 0.0), &config);
        assert_eq!(anim.key, AnimationKey::Pump);
    }

    #[test]
    fn no_kick_above_speed_limit() {
        let (config, mut controller, mut intent, mut anim) = setup();
        ground(&mut controller, &config);
        intent.set_steer(1.0);
        let fast = Vec2::new(config.kick_anim_max_speed + 10.0, 0.0);
        anim.update(&controller, &intent, fast, &config);
        assert_eq!(anim.key, AnimationKey::Pump);
    }

    #[test]
    fn no_kick_while_stalled() {
        let (config, mut controller, mut intent, mut anim) = setup();
        ground(&mut controller, &config);
        controller.stalled = true;
        intent.set_steer(1.0);
        anim.update(&controller, &intent, Vec2::new(50.0, 0.0), &config);
        assert_eq!(anim.key, AnimationKey::Pump);
    }

    #[test]
    fn brake_overrides_kick() {
        let (config, mut controller, mut intent, mut anim) = setup();
        ground(&mut controller, &config);
        intent.set_steer(1.0);
        anim.update(&controller, &intent, Vec2::new(100.0, 0.0), &config);
        assert_eq!(anim.key, AnimationKey::Kick);

        intent.set_drop(true);
        anim.update(&controller, &intent, Vec2::new(100.0, 0.0), &config);
        assert_eq!(anim.key, AnimationKey::Brake);
        assert!(!anim.kicking());
    }

    #[test]
    fn brief_air_gap_keeps_rolling_pose() {
        let (config, mut controller, intent, mut anim) = setup();
        controller.ground_timer = 0;
        controller.air_frames = config.air_anim_delay / 2;
        anim.update(&controller, &intent, Vec2::new(200.0, -20.0), &config);
        assert_eq!(anim.key, AnimationKey::Pump);
    }

    #[test]
    fn sustained_air_shows_airborne() {
        let (config, mut controller, intent, mut anim) = setup();
        controller.ground_timer = 0;
        controller.air_frames = config.air_anim_delay + 1;
        anim.update(&controller, &intent, Vec2::new(200.0, -20.0), &config);
        assert_eq!(anim.key, AnimationKey::Airborne);
    }

    #[test]
    fn strong_launch_shows_airborne_immediately() {
        let (config, mut controller, intent, mut anim) = setup();
        controller.ground_timer = 0;
        controller.air_frames = 0;
        let rising = Vec2::new(0.0, config.strong_rise_speed + 10.0);
        anim.update(&controller, &intent, rising, &config);
        assert_eq!(anim.key, AnimationKey::Airborne);
    }

    #[test]
    fn fast_fall_shows_airborne_immediately() {
        let (config, mut controller, intent, mut anim) = setup();
        controller.ground_timer = 0;
        controller.air_frames = 0;
        let falling = Vec2::new(0.0, -(config.fast_fall_speed + 10.0));
        anim.update(&controller, &intent, falling, &config);
        assert_eq!(anim.key, AnimationKey::Airborne);
    }

    #[test]
    fn slow_jump_off_steep_slope_shows_airborne_on_launch_tick() {
        let (config, mut controller, intent, mut anim) = setup();
        // As the jump system leaves things: footing dropped, air visual
        // primed past the debounce threshold.
        controller.ground_timer = 0;
        controller.air_frames = config.air_anim_delay + 1;
        // 75 degree surface normal, so the vertical component of a
        // normal-direction jump stays below the strong-rise shortcut.
        let normal = Vec2::new(75f32.to_radians().sin(), 75f32.to_radians().cos());
        let launch = normal * config.jump_speed;
        assert!(launch.y < config.strong_rise_speed);
        anim.update(&controller, &intent, launch, &config);
        assert_eq!(anim.key, AnimationKey::Airborne);
    }

    #[test]
    fn no_brake_without_footing() {
        let (config, mut controller, mut intent, mut anim) = setup();
        // Drop-through gesture: footing just lost, still inside the airborne
        // debounce window, drop held.
        controller.ground_timer = 0;
        controller.air_frames = 2;
        intent.set_drop(true);
        anim.update(&controller, &intent, Vec2::new(100.0, -50.0), &config);
        assert_eq!(anim.key, AnimationKey::Pump);
    }

    #[test]
    fn landing_cancels_airborne() {
        let (config, mut controller, intent, mut anim) = setup();
        controller.ground_timer = 0;
        controller.air_frames = config.air_anim_delay + 5;
        anim.update(&controller, &intent, Vec2::new(100.0, -50.0), &config);
        assert_eq!(anim.key, AnimationKey::Airborne);

        ground(&mut controller, &config);
        anim.update(&controller, &intent, Vec2::new(100.0, 0.0), &config);
        assert_eq!(anim.key, AnimationKey::Pump);
    }
}
