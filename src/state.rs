//! State marker components.
//!
//! Added and removed automatically by the controller systems so gameplay
//! code can filter queries on physical state without reading controller
//! internals.

use bevy::prelude::*;

/// Marker component indicating the skater has footing on a surface.
///
/// Present while the ground debounce timer is nonzero, so it persists
/// through the coyote window after the last real contact. Mutually
/// exclusive with [`Airborne`].
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use skate_controller::prelude::*;
///
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the skater has no footing.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the skater is pressed against a near-vertical
/// surface with no speed to ride it.
///
/// While present, kicks produce no force and a release acceleration pushes
/// the skater off the wall.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct WallStalled {
    /// Normal of the wall surface (points away from the wall).
    pub normal: Vec2,
}

impl Default for WallStalled {
    fn default() -> Self {
        Self { normal: Vec2::X }
    }
}

impl WallStalled {
    pub fn new(normal: Vec2) -> Self {
        Self { normal }
    }

    /// Check if the wall is on the left side of the skater.
    pub fn wall_on_left(&self) -> bool {
        self.normal.x > 0.0
    }

    /// Check if the wall is on the right side of the skater.
    pub fn wall_on_right(&self) -> bool {
        self.normal.x < 0.0
    }
}
