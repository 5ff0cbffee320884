//! # `skate_controller`
//!
//! An advanced 2D rigid-body skateboarding controller with physics backend
//! abstraction.
//!
//! This crate provides a responsive, tuneable skate controller that:
//! - Senses ground through contact normals (or a three-ray probe) with a
//!   coyote-time debounce
//! - Filters a visual lean angle from recent travel direction, fakie-aware
//! - Propels with kicks along the surface tangent, with slope stall,
//!   quadratic drag, and context-dependent momentum decay
//! - Handles one-way platforms by rewriting collision filters per tick
//! - Resolves a coarse animation key (idle, pump, kick, airborne, brake)
//! - Abstracts the physics backend for easy swapping (Rapier2D included)
//!
//! ## Architecture
//!
//! The skater is a rotation-locked dynamic rigidbody:
//! 1. The backend gathers this tick's contact normals (or probe ray hits)
//! 2. The sensor averages them into footing state and a ground normal
//! 3. Locomotion applies kick, slope-stick, drag, and decay from that state
//! 4. The visual lean is written straight to the Transform, never simulated
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use skate_controller::prelude::*;
//!
//! // Core components for a player-controlled skater
//! let bundle = SkaterBundle::new(SkateConfig::player());
//! ```

use bevy::prelude::*;

pub mod animation;
pub mod backend;
pub mod category;
pub mod config;
pub mod contact;
pub mod controller;
pub mod intent;
pub mod locomotion;
pub mod orientation;
pub mod sensor;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::animation::{AnimationIntent, AnimationKey};
    pub use crate::backend::SkatePhysicsBackend;
    pub use crate::config::{JumpStyle, SensorStrategy, SkateConfig, StallModel};
    pub use crate::controller::{Facing, SkateController};
    pub use crate::intent::SkateIntent;
    pub use crate::state::{Airborne, Grounded, WallStalled};
    pub use crate::{SkateControllerPlugin, SkateControllerSet, SkaterBundle};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dBackend, Rapier2dSkaterBundle};
}

/// Fixed-update phases of the controller, in execution order.
///
/// Backend plugins hook their sensing into `Sensors` and their force flush
/// into `FinalApplication`; the generic controller systems run in `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkateControllerSet {
    /// Force retraction and per-tick sensor reset.
    Preparation,
    /// Backend contact gathering and probe rays.
    Sensors,
    /// Footing, orientation, locomotion, jump, filters, animation.
    Update,
    /// Accumulated forces handed to the physics engine.
    FinalApplication,
}

/// Core components for a skater entity.
///
/// Physics components come from the backend (see `Rapier2dSkaterBundle` for
/// Rapier2D) and are spawned alongside.
#[derive(Bundle, Default)]
pub struct SkaterBundle {
    pub controller: controller::SkateController,
    pub config: config::SkateConfig,
    pub intent: intent::SkateIntent,
    pub animation: animation::AnimationIntent,
}

impl SkaterBundle {
    pub fn new(config: config::SkateConfig) -> Self {
        Self {
            controller: controller::SkateController::new(&config),
            config,
            intent: intent::SkateIntent::default(),
            animation: animation::AnimationIntent::default(),
        }
    }
}

/// Main plugin for the skate controller system.
///
/// This plugin is generic over a physics backend `B` which provides the
/// actual physics operations (velocity access, force application, collision
/// filters).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier2dBackend`)
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use skate_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(SkateControllerPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct SkateControllerPlugin<B: backend::SkatePhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::SkatePhysicsBackend> Default for SkateControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::SkatePhysicsBackend> Plugin for SkateControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<config::SkateConfig>();
        app.register_type::<controller::SkateController>();
        app.register_type::<intent::SkateIntent>();
        app.register_type::<animation::AnimationIntent>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::WallStalled>();

        app.configure_sets(
            FixedUpdate,
            (
                SkateControllerSet::Preparation,
                SkateControllerSet::Sensors,
                SkateControllerSet::Update,
                SkateControllerSet::FinalApplication,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            systems::begin_sensor_frame.in_set(SkateControllerSet::Preparation),
        );

        app.add_plugins(B::plugin());

        // Core systems run in FixedUpdate for deterministic tick behavior
        app.add_systems(
            FixedUpdate,
            (
                systems::update_ground_sensor::<B>,
                systems::update_orientation::<B>,
                systems::apply_locomotion::<B>,
                systems::apply_jump::<B>,
                systems::update_collision_filter::<B>,
                systems::update_animation::<B>,
                systems::sync_state_markers,
            )
                .chain()
                .in_set(SkateControllerSet::Update),
        );

        // Latch intent edges at end of fixed update
        app.add_systems(FixedPostUpdate, intent::settle_intents);
    }
}
