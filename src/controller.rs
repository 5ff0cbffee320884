//! Core rider state component.
//!
//! [`SkateController`] is the central hub for per-rider state: footing
//! debounce, accumulated surface normals, the orientation filters, and the
//! frame-isolated force accumulator the backend drains at the end of each
//! tick.

use bevy::prelude::*;

use crate::config::SkateConfig;
use crate::contact::SurfaceContact;
use crate::orientation::{normal_to_slope, LeanBuffer};

/// Which way the rider faces. Flipped by directional input, read by the
/// presentation layer.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// +1 for right, -1 for left.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing matching a steer direction; `None` for zero input.
    pub fn from_steer(steer: f32) -> Option<Self> {
        if steer > 0.0 {
            Some(Facing::Right)
        } else if steer < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

/// Per-rider locomotion state, mutated every simulation tick.
///
/// Footing is a debounced belief, not an instantaneous contact flag:
/// `ground_timer` is reset to the coyote ceiling on a qualifying contact and
/// counts down otherwise, and [`SkateController::has_footing`] is the only
/// footing authority.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct SkateController {
    /// Ticks of footing remaining. Unsigned, so never negative.
    pub ground_timer: u32,
    /// Combined contact normal from the last qualifying tick (unit length).
    pub ground_normal: Vec2,
    /// Low-pass-filtered ground normal driving forces and jump direction.
    pub smoothed_normal: Vec2,
    /// Recent velocity-derived slope angles (visual lean source).
    #[reflect(ignore)]
    pub lean: LeanBuffer,
    /// Published lean angle (running mean of the buffer, or the air lean).
    pub lean_angle: f32,
    /// Visual rotation owned by the controller, advanced by bounded steps.
    pub rotation: f32,
    /// Current facing, flipped by steering input.
    pub facing: Facing,
    /// Consecutive airborne ticks, for the airborne-visual debounce.
    pub air_frames: u32,
    /// Climb-stall: too steep, too slow, going up.
    pub stalled: bool,
    /// Wall-stall: riding a near-vertical surface below minimum ride speed.
    pub wall_stalled: bool,
    /// Collide-with mask recomputed this tick.
    pub collide_mask: u32,

    /// Contacts delivered by the backend for the current tick.
    #[reflect(ignore)]
    pub(crate) tick_contacts: Vec<SurfaceContact>,
    /// Ray-probe strategy result for the current tick.
    pub(crate) probe_grounded: bool,
    /// Body radius reported by the backend (probe ray length basis).
    pub(crate) body_radius: f32,

    // Force isolation: forces accumulate here during the tick and the
    // backend applies/retracts them around its integration step, so user
    // forces on the same body survive untouched.
    pub(crate) accumulated_force: Vec2,
    pub(crate) applied_force: Vec2,
}

impl Default for SkateController {
    fn default() -> Self {
        Self {
            ground_timer: 0,
            ground_normal: Vec2::Y,
            smoothed_normal: Vec2::Y,
            lean: LeanBuffer::new(5),
            lean_angle: 0.0,
            rotation: 0.0,
            facing: Facing::Right,
            air_frames: 0,
            stalled: false,
            wall_stalled: false,
            collide_mask: crate::category::default_collide_mask(),
            tick_contacts: Vec::new(),
            probe_grounded: false,
            body_radius: 0.0,
            accumulated_force: Vec2::ZERO,
            applied_force: Vec2::ZERO,
        }
    }
}

impl SkateController {
    /// Create a controller sized to a config's angle buffer.
    pub fn new(config: &SkateConfig) -> Self {
        Self {
            lean: LeanBuffer::new(config.angle_buffer_size),
            ..default()
        }
    }

    /// Debounced footing: true for `coyote_ticks` after the last qualifying
    /// contact.
    #[inline]
    pub fn has_footing(&self) -> bool {
        self.ground_timer > 0
    }

    /// Footing for force purposes: wall-stalled ticks are treated as
    /// airborne even though footing remains.
    #[inline]
    pub fn has_force_footing(&self) -> bool {
        self.has_footing() && !self.wall_stalled
    }

    /// Tangent of the smoothed surface, pointing rightward on flat ground.
    #[inline]
    pub fn surface_tangent(&self) -> Vec2 {
        Vec2::new(self.smoothed_normal.y, -self.smoothed_normal.x)
    }

    /// Slope angle of the smoothed normal (0 flat, ±π/2 vertical).
    #[inline]
    pub fn slope_angle(&self) -> f32 {
        normal_to_slope(self.smoothed_normal)
    }

    /// Reset or decrement the footing debounce for one tick.
    pub fn refresh_footing(&mut self, contact_this_tick: bool, coyote_ticks: u32) {
        if contact_this_tick {
            self.ground_timer = coyote_ticks;
        } else {
            self.ground_timer = self.ground_timer.saturating_sub(1);
        }
        if self.has_footing() {
            self.air_frames = 0;
        } else {
            self.air_frames = self.air_frames.saturating_add(1);
        }
    }

    /// Deliver one contact for the current tick (called by the backend).
    pub fn push_contact(&mut self, contact: SurfaceContact) {
        self.tick_contacts.push(contact);
    }

    /// The contacts delivered so far this tick.
    pub fn tick_contacts(&self) -> &[SurfaceContact] {
        &self.tick_contacts
    }

    /// Clear per-tick sensing inputs (start of frame).
    pub(crate) fn begin_tick(&mut self) {
        self.tick_contacts.clear();
        self.probe_grounded = false;
    }

    /// Accumulate a force for this tick.
    pub(crate) fn add_force(&mut self, force: Vec2) {
        self.accumulated_force += force;
    }

    /// Start of frame: returns the force applied last frame so the backend
    /// can retract it, and clears the accumulator.
    pub(crate) fn prepare_new_frame(&mut self) -> Vec2 {
        let previous = self.applied_force;
        self.accumulated_force = Vec2::ZERO;
        previous
    }

    /// End of frame: returns the force to hand to the physics engine and
    /// records it for next frame's retraction.
    pub(crate) fn finalize_frame(&mut self) -> Vec2 {
        self.applied_force = self.accumulated_force;
        self.applied_force
    }

    /// The force the controller handed to the physics engine last frame.
    pub fn applied_force(&self) -> Vec2 {
        self.applied_force
    }
}
