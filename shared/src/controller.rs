//! Controller systems and plugin.
//!
//! Frame-rate work (input, look, teleport, attack) runs at the start of the
//! fixed main loop so the movement steps of the same frame see the new rotation.
//! Movement integration runs in `FixedUpdate`.

use bevy::app::{RunFixedMainLoop, RunFixedMainLoopSystems};
use bevy::prelude::*;
use std::marker::PhantomData;

use crate::{
    backend::CollisionBackend,
    combat::{resolve_attack, AttackDebugDraw, DamageRegistry},
    components::{
        AttackParams, CameraPivot, CharacterBody, ControllerTuning, MotionState, PendingRemoval,
        PlayerController, TargetKind,
    },
    error::ConfigError,
    input::{ControllerInput, InputFrame},
    movement::apply_look,
    physics::step_character,
    player::FIXED_TIMESTEP_HZ,
    teleport::teleport_to_look_target,
};

/// Ordering of the controller's frame systems inside `RunFixedMainLoop`
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControllerSystems {
    /// Mirror ECS state into the collision backend
    SyncBackend,
    /// Fold `ControllerInput` messages into input frames
    Input,
    /// Look, teleport and attack
    Frame,
}

/// Sent once per attack, after damage has been dispatched
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackResolved {
    pub attacker: Entity,
    pub hits: usize,
    pub removed: usize,
    pub misconfigured: usize,
}

/// Character motion controller running against collision backend `B`.
///
/// The backend resource itself is inserted by the app (or by [`crate::ArenaPlugin`]).
pub struct CharacterControllerPlugin<B> {
    _backend: PhantomData<fn() -> B>,
}

impl<B> Default for CharacterControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _backend: PhantomData,
        }
    }
}

impl<B: CollisionBackend> Plugin for CharacterControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DamageRegistry>() {
            app.insert_resource(DamageRegistry::with_builtin_kinds());
        }

        app.add_message::<ControllerInput>()
            .add_message::<AttackResolved>()
            .init_resource::<AttackDebugDraw>()
            .insert_resource(Time::<Fixed>::from_hz(FIXED_TIMESTEP_HZ))
            .configure_sets(
                RunFixedMainLoop,
                (
                    ControllerSystems::SyncBackend,
                    ControllerSystems::Input,
                    ControllerSystems::Frame,
                )
                    .chain()
                    .in_set(RunFixedMainLoopSystems::BeforeFixedMainLoop),
            )
            .add_systems(PostStartup, validate_controllers::<B>)
            .add_systems(
                RunFixedMainLoop,
                (
                    apply_controller_input.in_set(ControllerSystems::Input),
                    (rotate_from_look, teleport_controllers::<B>, trigger_attacks::<B>)
                        .chain()
                        .in_set(ControllerSystems::Frame),
                ),
            )
            .add_systems(FixedUpdate, step_controllers::<B>)
            .add_systems(Update, despawn_pending_removals);
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Components a controller entity cannot run without
pub fn check_collaborators(
    entity: Entity,
    has_pivot: bool,
    has_body: bool,
) -> Result<(), ConfigError> {
    if !has_pivot {
        return Err(ConfigError::MissingCollaborator {
            entity,
            collaborator: "CameraPivot",
        });
    }
    if !has_body {
        return Err(ConfigError::MissingCollaborator {
            entity,
            collaborator: "CharacterBody",
        });
    }
    Ok(())
}

/// Fatal startup check: backend installed, every controller fully assembled.
pub fn validate_controllers<B: CollisionBackend>(
    backend: Option<Res<B>>,
    controllers: Query<(Entity, Has<CameraPivot>, Has<CharacterBody>), With<PlayerController>>,
) -> Result {
    if backend.is_none() {
        let err = ConfigError::MissingBackend {
            backend: std::any::type_name::<B>(),
        };
        error!("{err}");
        return Err(err.into());
    }

    let mut count = 0;
    for (entity, has_pivot, has_body) in controllers.iter() {
        if let Err(err) = check_collaborators(entity, has_pivot, has_body) {
            error!("{err}");
            return Err(err.into());
        }
        count += 1;
    }

    info!("{} controller(s) ready", count);
    Ok(())
}

// =============================================================================
// FRAME SYSTEMS
// =============================================================================

/// Deliver every input sample to every controller
pub fn apply_controller_input(
    mut inputs: MessageReader<ControllerInput>,
    mut frames: Query<&mut InputFrame, With<PlayerController>>,
) {
    for ControllerInput(action) in inputs.read() {
        for mut frame in frames.iter_mut() {
            frame.apply(*action);
        }
    }
}

pub fn rotate_from_look(
    time: Res<Time>,
    mut controllers: Query<
        (&InputFrame, &ControllerTuning, &mut Transform, &mut CameraPivot),
        With<PlayerController>,
    >,
) {
    let dt = time.delta_secs();
    for (input, tuning, mut transform, mut pivot) in controllers.iter_mut() {
        if input.look_axis == Vec2::ZERO {
            continue;
        }
        apply_look(input.look_axis, tuning, &mut transform, &mut pivot, dt);
    }
}

pub fn teleport_controllers<B: CollisionBackend>(
    mut backend: ResMut<B>,
    mut controllers: Query<
        (Entity, &InputFrame, &ControllerTuning, &CameraPivot, &mut Transform),
        With<PlayerController>,
    >,
) {
    for (entity, input, tuning, pivot, mut transform) in controllers.iter_mut() {
        if let Some(target) =
            teleport_to_look_target(&mut *backend, entity, input, tuning, pivot, &mut transform)
        {
            debug!("{entity} teleported to {target}");
        }
    }
}

/// Attack once per fire press
pub fn trigger_attacks<B: CollisionBackend>(
    mut commands: Commands,
    backend: Res<B>,
    registry: Res<DamageRegistry>,
    mut controllers: Query<
        (Entity, &Transform, &AttackParams, &mut InputFrame),
        With<PlayerController>,
    >,
    targets: Query<(Option<&TargetKind>, Option<&Name>)>,
    mut resolved: MessageWriter<AttackResolved>,
) {
    for (attacker, transform, params, mut input) in controllers.iter_mut() {
        if !input.take_fire_pressed() {
            continue;
        }
        info!("Attack called");

        let report = resolve_attack(
            &*backend,
            &registry,
            transform,
            params,
            |e| targets.get(e).ok().and_then(|(kind, _)| kind),
            |e| match targets.get(e) {
                Ok((_, Some(name))) => name.to_string(),
                _ => e.to_string(),
            },
        );

        for err in &report.errors {
            error!("{err}");
        }

        let mut removed = 0;
        for target in report.removed() {
            commands.entity(target).try_insert(PendingRemoval);
            removed += 1;
        }

        resolved.write(AttackResolved {
            attacker,
            hits: report.hits.len(),
            removed,
            misconfigured: report.errors.len(),
        });
    }
}

// =============================================================================
// FIXED STEP
// =============================================================================

pub fn step_controllers<B: CollisionBackend>(
    time: Res<Time>,
    mut backend: ResMut<B>,
    mut controllers: Query<
        (
            Entity,
            &InputFrame,
            &ControllerTuning,
            &CharacterBody,
            &mut Transform,
            &mut MotionState,
        ),
        With<PlayerController>,
    >,
) {
    let dt = time.delta_secs();
    for (entity, input, tuning, shape, mut transform, mut state) in controllers.iter_mut() {
        let was_grounded = state.grounded;
        step_character(
            &mut *backend,
            entity,
            input,
            tuning,
            shape,
            &mut transform,
            &mut state,
            dt,
        );
        if state.grounded != was_grounded {
            debug!(
                "{entity} {}",
                if state.grounded { "landed" } else { "left the ground" }
            );
        }
    }
}

// =============================================================================
// CLEANUP
// =============================================================================

pub fn despawn_pending_removals(
    mut commands: Commands,
    removed: Query<(Entity, Option<&Name>), With<PendingRemoval>>,
) {
    for (entity, name) in removed.iter() {
        match name {
            Some(name) => info!("{name} destroyed"),
            None => info!("{entity} destroyed"),
        }
        commands.entity(entity).despawn();
    }
}
