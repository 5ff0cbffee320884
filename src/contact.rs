//! Contact result structure.
//!
//! Holds the per-tick physics query results the ground sensor consumes.
//! The backend gathers them; the sensor never talks to the physics engine
//! directly, which keeps the accumulation logic testable with plain data.

use bevy::prelude::*;

/// One active contact against the rider for the current tick.
///
/// `normal` points away from the touched surface, toward the rider. For
/// ground below the rider it therefore has a positive `y` component; a
/// ceiling bump has a strongly negative one.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceContact {
    /// World-space surface normal at the contact, oriented toward the rider.
    pub normal: Vec2,
    /// The body touched, if known.
    pub other: Option<Entity>,
    /// Whether the touched body is a sensor. Sensors never count as footing.
    pub sensor: bool,
}

impl SurfaceContact {
    /// Create a contact against a solid body.
    pub fn solid(normal: Vec2, other: Option<Entity>) -> Self {
        Self {
            normal,
            other,
            sensor: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_contact_is_not_sensor() {
        let contact = SurfaceContact::solid(Vec2::Y, None);
        assert!(!contact.sensor);
        assert_eq!(contact.normal, Vec2::Y);
    }
}
