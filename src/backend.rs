//! Physics backend abstraction.
//!
//! This module defines the trait a physics backend must implement to drive
//! the skate controller. Surface sensing (contact gathering, ray probes) is
//! backend-specific and lives in the backend's own systems; the trait covers
//! the state access and force application the generic systems need.

use bevy::prelude::*;

/// Contract a physics engine must satisfy to carry a skater.
///
/// Besides these static accessors, a backend's plugin must register systems
/// that fill [`SkateController::push_contact`] or set `probe_grounded` each
/// tick before the sensor stage runs, and that flush accumulated forces to
/// the engine after the update stage.
///
/// The `rapier` module's [`Rapier2dBackend`](crate::rapier::Rapier2dBackend)
/// is the reference implementation.
///
/// [`SkateController::push_contact`]: crate::controller::SkateController::push_contact
pub trait SkatePhysicsBackend: 'static + Send + Sync {
    /// The component this backend stores linear velocity in.
    type VelocityComponent: Component;

    /// The plugin wiring this backend's systems into the schedule.
    fn plugin() -> impl Plugin;

    /// Read an entity's linear velocity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Overwrite an entity's linear velocity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Apply an instantaneous momentum change.
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec2);

    /// Apply a force, integrated over the physics timestep.
    fn apply_force(world: &mut World, entity: Entity, force: Vec2);

    /// Read an entity's rotation angle in radians.
    fn get_rotation(world: &World, entity: Entity) -> f32;

    /// Write an entity's rotation angle in radians.
    ///
    /// The skater's body is rotation-locked in the engine; the visual lean
    /// is written directly.
    fn set_rotation(world: &mut World, entity: Entity, rotation: f32);

    /// Read an entity's position.
    fn get_position(world: &World, entity: Entity) -> Vec2;

    /// Duration of one fixed physics tick in seconds.
    fn get_fixed_timestep(world: &World) -> f32;

    /// Write the collision filter bits for an entity.
    ///
    /// Used to exclude one-way platform colliders while ascending or
    /// dropping through.
    fn set_collision_filter(world: &mut World, entity: Entity, filter: u32);

    /// Read the collision filter bits for an entity, or `None` when the
    /// entity carries no collision groups.
    fn get_collision_filter(_world: &World, _entity: Entity) -> Option<u32> {
        None
    }

    /// Representative body radius, for sizing ground probe rays.
    fn get_body_radius(_world: &World, _entity: Entity) -> f32 {
        0.0
    }

    /// Body mass, so config accelerations hold regardless of collider size.
    fn get_mass(_world: &World, _entity: Entity) -> f32 {
        1.0
    }
}

/// Placeholder plugin for backends with no systems of their own.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
