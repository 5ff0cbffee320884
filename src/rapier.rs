//! Rapier2D backend: contact gathering, probe rays, and force flushing.
//!
//! Gated behind the `rapier2d` feature.

use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

use crate::backend::SkatePhysicsBackend;
use crate::category;
use crate::config::{SensorStrategy, SkateConfig};
use crate::contact::SurfaceContact;
use crate::controller::SkateController;
use crate::sensor::probe_rays;

/// Rapier2D physics backend for the skate controller.
///
/// This backend uses `bevy_rapier2d` for force application and velocity
/// manipulation. Surface sensing (contact pair gathering and ground probe
/// rays) is handled by dedicated Rapier systems that receive
/// `RapierContext` as a system parameter.
pub struct Rapier2dBackend;

impl SkatePhysicsBackend for Rapier2dBackend {
    type VelocityComponent = Velocity;

    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec2) {
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
        } else if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            // No ExternalImpulse component, fold into velocity directly
            vel.linvel += impulse;
        }
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec2) {
        // Accumulate into SkateController instead of directly modifying
        // ExternalForce; apply_controller_forces flushes at end of frame.
        if let Some(mut controller) = world.get_mut::<SkateController>(entity) {
            controller.add_force(force);
        }
    }

    fn get_rotation(world: &World, entity: Entity) -> f32 {
        world
            .get::<Transform>(entity)
            .map(|t| {
                let (_, _, z) = t.rotation.to_euler(EulerRot::XYZ);
                z
            })
            .unwrap_or(0.0)
    }

    fn set_rotation(world: &mut World, entity: Entity, rotation: f32) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.rotation = Quat::from_rotation_z(rotation);
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation.xy())
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.translation().xy())
            })
            .unwrap_or(Vec2::ZERO)
    }

    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }

    fn set_collision_filter(world: &mut World, entity: Entity, filter: u32) {
        if let Some(mut groups) = world.get_mut::<CollisionGroups>(entity) {
            groups.filters = Group::from_bits_truncate(filter);
        }
    }

    fn get_collision_filter(world: &World, entity: Entity) -> Option<u32> {
        world
            .get::<CollisionGroups>(entity)
            .map(|cg| cg.filters.bits())
    }

    fn get_body_radius(world: &World, entity: Entity) -> f32 {
        world
            .get::<Collider>(entity)
            .map(get_collider_radius)
            .unwrap_or(0.0)
    }

    fn get_mass(world: &World, entity: Entity) -> f32 {
        world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.mass)
            .filter(|m| *m > 0.0 && m.is_finite())
            .unwrap_or(1.0)
    }
}

/// Plugin that sets up Rapier2D-specific systems for the skate controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::SkateControllerSet;

        // Retract forces applied last frame
        app.add_systems(
            FixedUpdate,
            clear_controller_forces.in_set(SkateControllerSet::Preparation),
        );

        // Contact gathering runs first so ray-probe riders still get contact
        // normals when both sources report.
        app.add_systems(
            FixedUpdate,
            (gather_surface_contacts, probe_ground_rays)
                .chain()
                .in_set(SkateControllerSet::Sensors),
        );

        // Flush accumulated forces to the engine
        app.add_systems(
            FixedUpdate,
            apply_controller_forces.in_set(SkateControllerSet::FinalApplication),
        );
    }
}

/// Get a representative body radius from a collider, for probe ray sizing.
fn get_collider_radius(collider: &Collider) -> f32 {
    if let Some(capsule) = collider.as_capsule() {
        capsule.radius()
    } else if let Some(ball) = collider.as_ball() {
        ball.radius()
    } else if let Some(cuboid) = collider.as_cuboid() {
        // Use half the height as an approximation
        cuboid.half_extents().y
    } else {
        0.0
    }
}

/// Pull this tick's active contact pairs into the controller.
///
/// Manifold normals are world-space and point out of the first collider of
/// the pair, so the normal is flipped when the rider is that collider; the
/// controller always sees normals oriented toward the rider. Sensor
/// colliders produce no contact pairs in Rapier and never show up here.
fn gather_surface_contacts(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(Entity, &mut SkateController)>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, mut controller) in &mut q_controllers {
        for pair in context.contact_pairs_with(entity) {
            if !pair.has_any_active_contact() {
                continue;
            }

            let rider_is_first = pair.collider1() == Some(entity);
            let other = if rider_is_first {
                pair.collider2()
            } else {
                pair.collider1()
            };

            for manifold in pair.manifolds() {
                let mut normal: Vec2 = manifold.normal();
                if rider_is_first {
                    normal = -normal;
                }
                if normal == Vec2::ZERO {
                    continue;
                }
                controller.push_contact(SurfaceContact::solid(normal, other));
            }
        }
    }
}

/// Cast the three-ray ground probe for riders using the ray-probe strategy.
///
/// Rays start at the body center and reach one probe margin past the body
/// radius. Hits mark the rider probe-grounded and contribute their surface
/// normals to the same accumulator the contact strategy feeds. The rider's
/// own body, sensors, and currently filtered-out categories (one-way
/// platforms during ascent) are excluded.
fn probe_ground_rays(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(
        Entity,
        &GlobalTransform,
        &SkateConfig,
        &mut SkateController,
        Option<&Collider>,
        Option<&CollisionGroups>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, config, mut controller, collider, collision_groups) in
        &mut q_controllers
    {
        if config.sensor_strategy != SensorStrategy::RayProbe {
            continue;
        }

        let position = transform.translation().xy();

        if let Some(collider) = collider {
            controller.body_radius = get_collider_radius(collider);
        }

        let rotation = if config.probe_follows_rotation {
            controller.rotation
        } else {
            0.0
        };
        let rays = probe_rays(rotation, controller.body_radius, config);

        let memberships = collision_groups
            .map(|cg| cg.memberships)
            .unwrap_or(Group::from_bits_truncate(category::PLAYER));
        let filter = QueryFilter::default()
            .exclude_rigid_body(entity)
            .exclude_sensors()
            .groups(CollisionGroups::new(
                memberships,
                Group::from_bits_truncate(controller.collide_mask),
            ));

        for ray in rays {
            if let Some((hit_entity, intersection)) =
                context.cast_ray_and_get_normal(position, ray.direction, ray.length, true, filter)
            {
                controller.probe_grounded = true;
                controller.push_contact(SurfaceContact::solid(
                    intersection.normal,
                    Some(hit_entity),
                ));
            }
        }
    }
}

/// Retract last frame's controller force from `ExternalForce`.
///
/// Only the portion the controller applied is subtracted, so forces written
/// by user code outside the controller survive untouched.
pub fn clear_controller_forces(mut q: Query<(&mut ExternalForce, &mut SkateController)>) {
    for (mut ext_force, mut controller) in &mut q {
        let force_to_subtract = controller.prepare_new_frame();
        ext_force.force -= force_to_subtract;
    }
}

/// Apply accumulated controller forces at the end of each frame, recording
/// what was applied for next frame's retraction.
pub fn apply_controller_forces(mut q: Query<(&mut ExternalForce, &mut SkateController)>) {
    for (mut ext_force, mut controller) in &mut q {
        let force_to_apply = controller.finalize_frame();
        ext_force.force += force_to_apply;
    }
}

/// Collision groups for a rider body: member of the player category,
/// colliding with solid ground and one-way platforms.
pub fn rider_collision_groups() -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(category::PLAYER),
        Group::from_bits_truncate(category::default_collide_mask()),
    )
}

/// Collision groups for solid terrain colliders.
pub fn ground_collision_groups() -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(category::GROUND), Group::ALL)
}

/// Collision groups for one-way platform colliders.
///
/// Platforms stay in the one-way category; the rider's per-tick filter
/// update is what makes them passable from below.
pub fn one_way_collision_groups() -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(category::ONE_WAY), Group::ALL)
}

/// Bundle for creating a rider with Rapier2D physics.
///
/// Rotation is always locked: the visual lean is written to the Transform by
/// the orientation system, never simulated. Contact friction and restitution
/// are zeroed so all speed changes come from the locomotion model.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use skate_controller::prelude::*;
/// use skate_controller::rapier::Rapier2dSkaterBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 100.0, 0.0),
///         SkaterBundle::new(SkateConfig::player()),
///         Rapier2dSkaterBundle::new(),
///         Collider::ball(16.0),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dSkaterBundle {
    /// The rigid body type. [`RigidBody::Dynamic`] for riders.
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. Updated by Rapier each step.
    pub velocity: Velocity,
    /// Accumulated forces applied this frame. Controller systems write here.
    pub external_force: ExternalForce,
    /// Accumulated impulses, used for instantaneous velocity changes.
    pub external_impulse: ExternalImpulse,
    /// Rotation locked, the lean is purely visual.
    pub locked_axes: LockedAxes,
    /// Damping is zeroed; the locomotion decay model owns deceleration.
    pub damping: Damping,
    /// No contact friction, rolling resistance comes from the decay model.
    pub friction: Friction,
    /// No bounce on landings.
    pub restitution: Restitution,
    /// Player category, colliding with ground and one-way platforms.
    pub collision_groups: CollisionGroups,
    /// Computed mass properties, updated by Rapier from the collider.
    pub mass_properties: ReadMassProperties,
}

impl Default for Rapier2dSkaterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dSkaterBundle {
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_force: ExternalForce::default(),
            external_impulse: ExternalImpulse::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 0.0,
            },
            friction: Friction {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Min,
            },
            restitution: Restitution {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Min,
            },
            collision_groups: rider_collision_groups(),
            mass_properties: ReadMassProperties::default(),
        }
    }

    /// Override the collision groups.
    pub fn with_collision_groups(mut self, groups: CollisionGroups) -> Self {
        self.collision_groups = groups;
        self
    }

    /// Set the damping coefficients, for games that want Rapier-side
    /// deceleration on top of the decay model.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }
}
