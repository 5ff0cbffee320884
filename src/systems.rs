//! Core controller systems.
//!
//! These systems implement the skate controller behavior each fixed tick:
//! ground sensing, orientation and lean filtering, locomotion forces, jump,
//! one-way platform filtering, and animation resolution. They are generic
//! over the physics backend so different physics engines can be used.

use bevy::prelude::*;

use crate::animation::AnimationIntent;
use crate::backend::SkatePhysicsBackend;
use crate::category;
use crate::config::{SensorStrategy, SkateConfig};
use crate::controller::SkateController;
use crate::intent::SkateIntent;
use crate::locomotion;
use crate::orientation;
use crate::sensor;
use crate::state::{Airborne, Grounded, WallStalled};

/// Clear the per-tick sensing inputs before the backend gathers new ones.
pub fn begin_sensor_frame(mut q: Query<&mut SkateController>) {
    for mut controller in &mut q {
        controller.begin_tick();
    }
}

/// Resolve footing from this tick's surface contacts.
///
/// Consumes the contact list the backend gathered, averages the usable
/// normals, and updates the debounce timer, ground normal, and the stall
/// flags. Under [`SensorStrategy::RayProbe`] groundedness comes from the
/// backend's ray probe instead of contact presence; ray hits still feed the
/// normal average.
pub fn update_ground_sensor<B: SkatePhysicsBackend>(world: &mut World) {
    let entities: Vec<Entity> = world
        .query_filtered::<Entity, (With<SkateController>, With<SkateConfig>)>()
        .iter(world)
        .collect();

    for entity in entities {
        let velocity = B::get_velocity(world, entity);

        let Some(config) = world.get::<SkateConfig>(entity).copied() else {
            continue;
        };
        let Some(mut controller) = world.get_mut::<SkateController>(entity) else {
            continue;
        };

        let sample =
            sensor::accumulate_contacts(controller.tick_contacts(), config.ceiling_exclusion);

        let grounded = match config.sensor_strategy {
            SensorStrategy::ContactNormals => sample.grounded,
            SensorStrategy::RayProbe => controller.probe_grounded,
        };
        controller.refresh_footing(grounded, config.coyote_ticks);

        if let Some(normal) = sample.normal {
            controller.ground_normal = normal;
        }

        let normal = controller.ground_normal;
        controller.wall_stalled = grounded && sensor::is_wall_stalled(normal, velocity, &config);

        let slope = controller.slope_angle();
        let speed = velocity.length();
        controller.stalled = locomotion::is_climb_stalled(
            controller.has_footing(),
            slope,
            velocity.y,
            speed,
            &config,
        );
    }
}

/// Blend the smoothed surface normal and step the visual lean.
///
/// The smoothed normal eases toward the sensed ground normal while footed
/// and relaxes back to world up in the air. The lean angle comes from a
/// bounded buffer of recent travel-direction samples, folded into the
/// facing frame so riding fakie does not flip the body, and the sprite
/// rotation steps toward it at a fixed rate.
pub fn update_orientation<B: SkatePhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, SkateConfig, f32)> = world
        .query::<(Entity, &SkateConfig, &SkateIntent)>()
        .iter(world)
        .map(|(e, config, intent)| (e, *config, intent.steer))
        .collect();

    for (entity, config, steer) in entities {
        let velocity = B::get_velocity(world, entity);
        let speed = velocity.length();

        let Some(mut controller) = world.get_mut::<SkateController>(entity) else {
            continue;
        };

        if let Some(facing) = crate::controller::Facing::from_steer(steer) {
            controller.facing = facing;
        }
        let facing_sign = controller.facing.sign();

        // Surface normal easing.
        let target = if controller.has_force_footing() {
            controller.ground_normal
        } else {
            Vec2::Y
        };
        let factor = if controller.has_force_footing() {
            config.ground_blend
        } else {
            config.air_blend
        };
        controller.smoothed_normal =
            orientation::blend_normal(controller.smoothed_normal, target, factor);

        // Lean sampling from the direction of travel, in the facing frame.
        let sampling = controller.has_force_footing() && !controller.stalled;
        if sampling && speed > config.min_angle_speed {
            let raw = velocity.y.atan2(velocity.x * facing_sign);
            let folded = orientation::fold_fakie(raw);
            if folded.abs() < config.max_slope_angle {
                let adjusted = match controller.lean.mean() {
                    Some(mean) => {
                        orientation::fold_continuity(folded, mean, config.continuity_fold)
                    }
                    None => folded,
                };
                controller.lean.push(adjusted);
            }
        } else if !sampling {
            controller.lean.clear();
        }

        let visual_target = if controller.has_force_footing() {
            controller.lean.mean().unwrap_or(0.0) * facing_sign
        } else if controller.has_footing() {
            // Wall-stalled: level out while the release push works.
            0.0
        } else {
            config.air_lean_angle * facing_sign
        };

        controller.lean_angle =
            orientation::rotate_toward(controller.lean_angle, visual_target, config.lean_step);
        let rotation = controller.lean_angle;
        controller.rotation = rotation;

        B::set_rotation(world, entity, rotation);
    }
}

/// Apply the tick's locomotion to velocity and the force accumulator.
///
/// Brake is exclusive with everything else. Otherwise: kick along the
/// surface tangent scaled by the stall factor, slope-stick while riding a
/// rideable slope, wall release push while wall-stalled, quadratic drag,
/// then the multiplicative decay and hard speed cap applied directly to
/// velocity.
pub fn apply_locomotion<B: SkatePhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, SkateConfig, SkateIntent, SkateController)> = world
        .query::<(Entity, &SkateConfig, &SkateIntent, &SkateController)>()
        .iter(world)
        .map(|(e, config, intent, controller)| {
            (e, *config, intent.clone(), controller.clone())
        })
        .collect();

    for (entity, config, intent, controller) in entities {
        let mut velocity = B::get_velocity(world, entity);
        let mass = B::get_mass(world, entity);
        let speed = velocity.length();
        let footed = controller.has_force_footing();
        let slope = controller.slope_angle();

        let mut force = Vec2::ZERO;

        if intent.drop && controller.has_footing() {
            velocity = locomotion::brake(velocity, config.brake_factor);
        } else {
            if intent.steer != 0.0 {
                let accel = locomotion::kick_accel(speed, &config)
                    * locomotion::stall_factor(
                        controller.stalled,
                        controller.wall_stalled,
                        slope,
                        &config,
                    );
                let direction = if footed {
                    controller.surface_tangent() * intent.steer
                } else {
                    Vec2::X * intent.steer * config.air_control
                };
                force += direction * accel * mass;
            }

            if footed && !intent.ascend && slope.abs() < config.max_slope_angle {
                let stick = if config.stick_straight_down {
                    Vec2::NEG_Y
                } else {
                    -controller.ground_normal
                };
                force += stick * config.slope_stick_accel * mass;
            }
        }

        if controller.wall_stalled {
            force += controller.ground_normal * config.wall_release_accel * mass;
        }

        force += locomotion::quadratic_drag(velocity, &config) * mass;

        let carving = footed && slope.abs() > 0.05;
        let coeff = locomotion::decay_coeff(controller.has_footing(), carving, &config);
        velocity = locomotion::apply_decay(velocity, coeff);
        velocity = locomotion::cap_speed(velocity, config.max_speed);

        if let Some(mut controller) = world.get_mut::<SkateController>(entity) {
            controller.add_force(force);
        }
        B::set_velocity(world, entity, velocity);
    }
}

/// Launch off the surface on a fresh jump press.
///
/// The velocity component along the jump direction is replaced outright so
/// jump height is consistent, footing is dropped immediately, and the
/// airborne animation is primed.
pub fn apply_jump<B: SkatePhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, SkateConfig)> = world
        .query::<(Entity, &SkateConfig, &SkateIntent, &SkateController)>()
        .iter(world)
        .filter(|(_, _, intent, controller)| {
            intent.ascend_just_pressed()
                && controller.has_footing()
                && !controller.wall_stalled
        })
        .map(|(e, config, _, _)| (e, *config))
        .collect();

    for (entity, config) in entities {
        let velocity = B::get_velocity(world, entity);

        let Some(mut controller) = world.get_mut::<SkateController>(entity) else {
            continue;
        };
        let direction =
            locomotion::jump_direction(controller.smoothed_normal, config.jump_style);
        controller.ground_timer = 0;
        // Past the debounce threshold so the airborne pose shows this tick
        // even on a slow launch off a steep slope.
        controller.air_frames = config.air_anim_delay + 1;

        let new_velocity = locomotion::jump_velocity(velocity, direction, config.jump_speed);
        B::set_velocity(world, entity, new_velocity);
    }
}

/// Refresh the one-way platform filter from vertical speed and drop intent.
///
/// One-way colliders are masked out while rising faster than the ascend
/// threshold or while drop is held, and restored otherwise. The filter is
/// only written to the backend when it changes.
pub fn update_collision_filter<B: SkatePhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, f32, bool)> = world
        .query::<(Entity, &SkateConfig, &SkateIntent)>()
        .iter(world)
        .map(|(e, config, intent)| (e, config.one_way_ascend_threshold, intent.drop))
        .collect();

    for (entity, threshold, drop) in entities {
        let velocity = B::get_velocity(world, entity);
        let mask = category::collide_mask(velocity.y, drop, threshold);

        let Some(mut controller) = world.get_mut::<SkateController>(entity) else {
            continue;
        };
        if controller.collide_mask == mask {
            continue;
        }
        controller.collide_mask = mask;
        B::set_collision_filter(world, entity, mask);
    }
}

/// Resolve the animation key for the tick.
pub fn update_animation<B: SkatePhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, SkateConfig, SkateIntent, SkateController)> = world
        .query::<(
            Entity,
            &SkateConfig,
            &SkateIntent,
            &SkateController,
            &AnimationIntent,
        )>()
        .iter(world)
        .map(|(e, config, intent, controller, _)| {
            (e, *config, intent.clone(), controller.clone())
        })
        .collect();

    for (entity, config, intent, controller) in entities {
        let velocity = B::get_velocity(world, entity);
        if let Some(mut animation) = world.get_mut::<AnimationIntent>(entity) {
            animation.update(&controller, &intent, velocity, &config);
        }
    }
}

/// Sync state marker components from controller state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &SkateController,
        Has<Grounded>,
        Has<Airborne>,
        Has<WallStalled>,
    )>,
) {
    for (entity, controller, has_grounded, has_airborne, has_wall) in &q_controllers {
        let footed = controller.has_footing();

        if footed && !has_grounded {
            commands.entity(entity).insert(Grounded);
            commands.entity(entity).remove::<Airborne>();
        } else if !footed && has_grounded {
            commands.entity(entity).remove::<Grounded>();
            commands.entity(entity).insert(Airborne);
        } else if !footed && !has_airborne && !has_grounded {
            commands.entity(entity).insert(Airborne);
        }

        if controller.wall_stalled && !has_wall {
            commands
                .entity(entity)
                .insert(WallStalled::new(controller.ground_normal));
        } else if !controller.wall_stalled && has_wall {
            commands.entity(entity).remove::<WallStalled>();
        }
    }
}
