//! Ground sensing.
//!
//! Two interchangeable strategies decide, each tick, whether the rider has
//! footing and what surface it is resting against:
//!
//! * **Contact-normal accumulation** (primary): every active contact pair
//!   delivered by the backend contributes its normal, ceilings excluded, and
//!   the survivors are vector-summed into one combined ground normal.
//! * **Ray probing** (fallback): three short rays fanned around local down;
//!   any non-sensor hit counts as footing.
//!
//! Both feed the same debounce: a qualifying tick resets `ground_timer` to
//! the coyote ceiling, and footing is the timer, never the raw contact.

use bevy::prelude::*;

use crate::config::SkateConfig;
use crate::contact::SurfaceContact;

/// Outcome of one tick of ground sensing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSample {
    /// Whether a qualifying contact existed this tick.
    pub grounded: bool,
    /// Combined surface normal, when the strategy produces one.
    pub normal: Option<Vec2>,
}

impl GroundSample {
    /// The airborne sample.
    pub const AIRBORNE: Self = Self {
        grounded: false,
        normal: None,
    };
}

/// Accumulate a tick's contact list into a single ground sample.
///
/// Sensor contacts never qualify. Ceiling contacts (normal `y` below
/// `ceiling_exclusion`, i.e. pointing down into the rider) are excluded so
/// underside bumps don't overwrite the ride surface, but any other contact
/// grounds the rider. Qualifying normals are vector-summed and renormalized;
/// if they cancel exactly, no normal is published and the previous smoothed
/// value stays in charge.
pub fn accumulate_contacts(contacts: &[SurfaceContact], ceiling_exclusion: f32) -> GroundSample {
    let mut sum = Vec2::ZERO;
    let mut grounded = false;

    for contact in contacts {
        if contact.sensor {
            continue;
        }
        if contact.normal.y < ceiling_exclusion {
            continue;
        }
        grounded = true;
        sum += contact.normal;
    }

    if !grounded {
        return GroundSample::AIRBORNE;
    }

    let combined = sum.normalize_or_zero();
    GroundSample {
        grounded: true,
        normal: (combined != Vec2::ZERO).then_some(combined),
    }
}

/// Steep-wall stall test.
///
/// True when the resting normal is near-horizontal (a wall) and the speed
/// along the wall is below the minimum ride speed: the rider is glued to a
/// surface it cannot actually ride.
pub fn is_wall_stalled(normal: Vec2, velocity: Vec2, config: &SkateConfig) -> bool {
    if normal.x.abs() <= config.wall_steepness {
        return false;
    }
    let tangent = Vec2::new(normal.y, -normal.x);
    velocity.dot(tangent).abs() < config.min_ride_speed
}

/// One probe ray: origin offset is always zero (rays start at the body
/// origin); direction is unit length.
#[derive(Debug, Clone, Copy)]
pub struct ProbeRay {
    pub direction: Vec2,
    pub length: f32,
}

/// Build the three probe rays for the ray-probe strategy: straight down plus
/// two lateral fans, optionally rotated with the body so steep surfaces stay
/// under the board. Directions are normalized so the diagonal rays aren't
/// longer.
pub fn probe_rays(rotation: f32, body_radius: f32, config: &SkateConfig) -> [ProbeRay; 3] {
    let length = body_radius + config.probe_margin;
    let lateral = config.probe_lateral;

    let raw = [
        Vec2::new(0.0, -1.0),
        Vec2::new(-lateral, -1.0),
        Vec2::new(lateral, -1.0),
    ];

    raw.map(|dir| {
        let mut direction = dir.normalize_or_zero();
        if direction == Vec2::ZERO {
            direction = Vec2::NEG_Y;
        }
        if config.probe_follows_rotation {
            direction = Vec2::from_angle(rotation).rotate(direction);
        }
        ProbeRay { direction, length }
    })
}
