//! Movement intents.
//!
//! A gameplay layer (input mapping, AI, replay playback) writes intents onto
//! the character each frame; the controller consumes them in `FixedUpdate`.
//! The component keeps the previous tick's values so edge-triggered actions
//! (a fresh kick, a jump press) can be detected without an event channel.

use bevy::prelude::*;

/// Per-tick movement intent for a skater.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct SkateIntent {
    /// Horizontal steer in `[-1, 1]`. Nonzero means "kick in this direction".
    pub steer: f32,
    /// Jump request.
    pub ascend: bool,
    /// Down request. Brakes while grounded and drops through one-way
    /// platforms.
    pub drop: bool,

    steer_prev: f32,
    ascend_prev: bool,
}

impl SkateIntent {
    pub fn set_steer(&mut self, steer: f32) {
        self.steer = steer.clamp(-1.0, 1.0);
    }

    pub fn set_ascend(&mut self, ascend: bool) {
        self.ascend = ascend;
    }

    pub fn set_drop(&mut self, drop: bool) {
        self.drop = drop;
    }

    /// True on the tick the jump input goes down.
    pub fn ascend_just_pressed(&self) -> bool {
        self.ascend && !self.ascend_prev
    }

    /// True on the tick a kick starts: steer becomes active, or flips sign
    /// while active (an immediate push the other way).
    pub fn steer_just_pressed(&self) -> bool {
        if self.steer == 0.0 {
            return false;
        }
        self.steer_prev == 0.0 || self.steer.signum() != self.steer_prev.signum()
    }

    /// Latch the current values as "previous" for the next tick's edge
    /// detection. Runs after the controller has consumed the intent.
    pub fn settle(&mut self) {
        self.steer_prev = self.steer;
        self.ascend_prev = self.ascend;
    }
}

/// Latches intent edges after each fixed tick.
pub fn settle_intents(mut intents: Query<&mut SkateIntent>) {
    for mut intent in intents.iter_mut() {
        intent.settle();
    }
}
