//! Collision category vocabulary.
//!
//! The controller expresses collision filtering as plain `u32` bit masks so
//! the core stays backend-agnostic; the physics backend maps these bits onto
//! its own group type (e.g. Rapier's `Group`).

/// Solid terrain: ground, ramps, curves, walls.
pub const GROUND: u32 = 1 << 0;

/// One-way platforms: collidable from above, passable when ascending or on
/// drop input.
pub const ONE_WAY: u32 = 1 << 1;

/// The rider's own body.
pub const PLAYER: u32 = 1 << 2;

/// Generic trigger volumes (zones, pickups). Never qualifies as footing.
pub const SENSOR: u32 = 1 << 3;

/// Decorative sensors (graffiti spots and the like).
pub const DECOR_SENSOR: u32 = 1 << 4;

/// The mask a rider collides with while grounded or falling.
#[inline]
pub const fn default_collide_mask() -> u32 {
    GROUND | ONE_WAY
}

/// Recompute the collide-with mask for one tick.
///
/// The one-way category is excluded whenever the rider moves upward faster
/// than `ascend_threshold`, or while the drop input is held. This must run
/// every tick since vertical velocity changes continuously.
pub fn collide_mask(upward_speed: f32, drop_held: bool, ascend_threshold: f32) -> u32 {
    if upward_speed > ascend_threshold || drop_held {
        GROUND
    } else {
        GROUND | ONE_WAY
    }
}
