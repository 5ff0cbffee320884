//! Controller tuning configuration.
//!
//! All gameplay-feel parameters live in one immutable [`SkateConfig`] record
//! passed in at spawn, so tests and replays can parameterize the controller
//! without touching globals.

use bevy::prelude::*;

/// Which ground-sensing strategy the controller runs each tick.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorStrategy {
    /// Accumulate the tick's active contact normals into a single combined
    /// ground normal. Handles walls and ceilings correctly; the primary
    /// strategy.
    #[default]
    ContactNormals,
    /// Cast three short rays (down, down-left, down-right) and treat any
    /// non-sensor hit as footing. Surface orientation then comes from the
    /// velocity-derived lean filter instead of contact normals.
    RayProbe,
}

/// How kick propulsion degrades on steep slopes.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StallModel {
    /// Kick drops to exactly zero once the stall conditions hold.
    #[default]
    HardCutoff,
    /// Kick scales with cos²(slope): full power on flat ground, zero at
    /// vertical, non-linear falloff in between.
    CosineSquared,
}

/// Direction of the jump impulse.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpStyle {
    /// Jump along the smoothed surface normal (ramps launch you outward).
    #[default]
    SurfaceNormal,
    /// Jump straight up in world space regardless of the surface.
    WorldUp,
}

/// Tuning parameters for the skate controller.
///
/// Speeds are world units per second, accelerations units per second², and
/// per-tick factors assume the fixed simulation rate (60 Hz by default).
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct SkateConfig {
    // === Kick propulsion ===
    /// Kick acceleration below `free_roll_speed` (slow push-off).
    pub kick_accel_start: f32,
    /// Kick acceleration above `free_roll_speed` (diminished push at speed).
    pub kick_accel_fast: f32,
    /// Speed above which push-off efficiency drops and drag engages.
    pub free_roll_speed: f32,
    /// Hard speed cap; velocity is rescaled down to this after all forces.
    pub max_speed: f32,
    /// Kick scale while airborne (limited mid-air steering).
    pub air_control: f32,

    // === Drag ===
    /// Quadratic drag coefficient: deceleration = coeff * speed², applied
    /// only above `free_roll_speed`.
    pub drag_coeff: f32,
    /// Per-tick multiplicative velocity decay on flat ground.
    pub flat_decay: f32,
    /// Per-tick decay while carving a slope (near zero so ramps keep
    /// momentum).
    pub carve_decay: f32,
    /// Per-tick decay while airborne.
    pub air_decay: f32,

    // === Jump ===
    /// Velocity change applied along the jump direction.
    pub jump_speed: f32,
    /// Surface-normal-relative or world-up jumps.
    pub jump_style: JumpStyle,

    // === Slope & stall ===
    /// Acceleration pressing the rider into the surface while grounded and
    /// the ascend input is released. Prevents launching off convex crests.
    pub slope_stick_accel: f32,
    /// Apply slope-stick straight down instead of along the inward normal.
    pub stick_straight_down: bool,
    /// Slopes beyond this angle (radians) get no stick force and no lean
    /// samples.
    pub max_slope_angle: f32,
    /// Slope angle (radians) beyond which the climb stall check applies.
    pub stall_slope: f32,
    /// Minimum speed to keep climbing a steep slope; below it, ascending
    /// kicks stall out.
    pub min_vert_speed: f32,
    /// Hard cutoff or continuous cos² attenuation.
    pub stall_model: StallModel,

    // === Wall stall ===
    /// Horizontal normal magnitude above which the surface counts as a wall.
    pub wall_steepness: f32,
    /// Minimum tangential speed to ride a wall; below it the rider is
    /// wall-stalled.
    pub min_ride_speed: f32,
    /// Outward-normal acceleration releasing a wall-stalled rider.
    pub wall_release_accel: f32,

    // === Brake ===
    /// Per-tick velocity scale while braking (e.g. 0.90).
    pub brake_factor: f32,

    // === Ground sensing ===
    /// Sensing strategy for this rider.
    pub sensor_strategy: SensorStrategy,
    /// Coyote time: ticks of footing granted after the last qualifying
    /// contact.
    pub coyote_ticks: u32,
    /// Extra probe ray length beyond the body radius.
    pub probe_margin: f32,
    /// Lateral slope of the two off-center probe rays (x per unit of down).
    pub probe_lateral: f32,
    /// Rotate probe rays with the body so steep surfaces stay probed.
    pub probe_follows_rotation: bool,
    /// Contacts whose normal `y` falls below this are ceilings and never
    /// overwrite the ride surface.
    pub ceiling_exclusion: f32,

    // === Orientation filter ===
    /// Per-tick blend of the smoothed normal toward the sampled ground
    /// normal while grounded.
    pub ground_blend: f32,
    /// Per-tick blend toward the neutral target while airborne (slower).
    pub air_blend: f32,
    /// Visual lean angle (radians) while airborne.
    pub air_lean_angle: f32,
    /// Maximum visual rotation step per tick (radians); rotation never
    /// snaps.
    pub lean_step: f32,
    /// Capacity of the recent-slope-angle buffer (FIFO).
    pub angle_buffer_size: usize,
    /// Minimum speed before a velocity-derived angle is sampled.
    pub min_angle_speed: f32,
    /// A raw sample differing from the running mean by more than this
    /// (radians) is treated as wrap-around and folded by ±180°.
    pub continuity_fold: f32,

    // === One-way platforms ===
    /// Upward speed beyond which the one-way category is excluded.
    pub one_way_ascend_threshold: f32,

    // === Animation intent ===
    /// Consecutive airborne ticks before the airborne visual engages.
    pub air_anim_delay: u32,
    /// Downward speed that forces the airborne visual without waiting for
    /// the debounce.
    pub fast_fall_speed: f32,
    /// Upward speed that forces the airborne visual immediately (responsive
    /// jump feedback).
    pub strong_rise_speed: f32,
    /// Ticks a started kick animation plays to completion.
    pub kick_anim_ticks: u32,
    /// No kick animation above this speed (the push barely registers).
    pub kick_anim_max_speed: f32,
    /// Below this speed the grounded default is `Idle` instead of `Pump`.
    pub idle_speed: f32,
}

impl Default for SkateConfig {
    fn default() -> Self {
        Self {
            // Kick propulsion
            kick_accel_start: 900.0,
            kick_accel_fast: 500.0,
            free_roll_speed: 240.0,
            max_speed: 600.0,
            air_control: 0.35,

            // Drag
            drag_coeff: 0.0025,
            flat_decay: 0.02,
            carve_decay: 0.002,
            air_decay: 0.01,

            // Jump
            jump_speed: 350.0,
            jump_style: JumpStyle::SurfaceNormal,

            // Slope & stall
            slope_stick_accel: 300.0,
            stick_straight_down: false,
            max_slope_angle: 1.6,
            stall_slope: 0.4,
            min_vert_speed: 150.0,
            stall_model: StallModel::HardCutoff,

            // Wall stall
            wall_steepness: 0.8,
            min_ride_speed: 100.0,
            wall_release_accel: 220.0,

            // Brake
            brake_factor: 0.90,

            // Ground sensing
            sensor_strategy: SensorStrategy::ContactNormals,
            coyote_ticks: 6,
            probe_margin: 12.0,
            probe_lateral: 0.5,
            probe_follows_rotation: true,
            ceiling_exclusion: -0.2,

            // Orientation filter
            ground_blend: 0.15,
            air_blend: 0.08,
            air_lean_angle: -0.25,
            lean_step: 0.15,
            angle_buffer_size: 5,
            min_angle_speed: 30.0,
            continuity_fold: 2.0,

            // One-way platforms
            one_way_ascend_threshold: 60.0,

            // Animation intent
            air_anim_delay: 8,
            fast_fall_speed: 200.0,
            strong_rise_speed: 150.0,
            kick_anim_ticks: 30,
            kick_anim_max_speed: 550.0,
            idle_speed: 25.0,
        }
    }
}

impl SkateConfig {
    /// Config tuned for a responsive player rider.
    pub fn player() -> Self {
        Self {
            kick_accel_start: 1100.0,
            jump_speed: 380.0,
            ..default()
        }
    }

    /// Default config with the ray-probe sensing strategy.
    pub fn ray_probe() -> Self {
        Self {
            sensor_strategy: SensorStrategy::RayProbe,
            ..default()
        }
    }

    /// Builder: set the kick accelerations.
    pub fn with_kick(mut self, start: f32, fast: f32) -> Self {
        self.kick_accel_start = start;
        self.kick_accel_fast = fast;
        self
    }

    /// Builder: set the hard speed cap.
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Builder: set the free-roll speed threshold.
    pub fn with_free_roll_speed(mut self, speed: f32) -> Self {
        self.free_roll_speed = speed;
        self
    }

    /// Builder: set the jump speed.
    pub fn with_jump_speed(mut self, speed: f32) -> Self {
        self.jump_speed = speed;
        self
    }

    /// Builder: set the jump direction style.
    pub fn with_jump_style(mut self, style: JumpStyle) -> Self {
        self.jump_style = style;
        self
    }

    /// Builder: set coyote time in ticks.
    pub fn with_coyote_ticks(mut self, ticks: u32) -> Self {
        self.coyote_ticks = ticks;
        self
    }

    /// Builder: set the sensing strategy.
    pub fn with_sensor_strategy(mut self, strategy: SensorStrategy) -> Self {
        self.sensor_strategy = strategy;
        self
    }

    /// Builder: set the stall model.
    pub fn with_stall_model(mut self, model: StallModel) -> Self {
        self.stall_model = model;
        self
    }

    /// Builder: set the stall thresholds (slope angle, minimum climb speed).
    pub fn with_stall_thresholds(mut self, slope: f32, min_vert_speed: f32) -> Self {
        self.stall_slope = slope;
        self.min_vert_speed = min_vert_speed;
        self
    }

    /// Builder: set the wall-stall thresholds.
    pub fn with_wall_stall(mut self, steepness: f32, min_ride_speed: f32) -> Self {
        self.wall_steepness = steepness;
        self.min_ride_speed = min_ride_speed;
        self
    }

    /// Builder: set the brake factor.
    pub fn with_brake_factor(mut self, factor: f32) -> Self {
        self.brake_factor = factor;
        self
    }

    /// Builder: set the grounded/airborne orientation blend factors.
    pub fn with_blend(mut self, ground: f32, air: f32) -> Self {
        self.ground_blend = ground;
        self.air_blend = air;
        self
    }

    /// Builder: set the one-way ascend exclusion threshold.
    pub fn with_one_way_ascend_threshold(mut self, threshold: f32) -> Self {
        self.one_way_ascend_threshold = threshold;
        self
    }
}
