//! Arena setup: spawns the controller, static geometry, targets and drifters
//! from [`ControllerConfig`] / [`ArenaConfig`].

use bevy::app::RunFixedMainLoop;
use bevy::prelude::*;

use crate::{
    arena::{sync_target_bodies, ArenaWorld, StaticBox},
    components::{
        CameraPivot, EnemyTarget, PlayerController, SurfaceTag, TargetBody, TargetKind,
    },
    config::{ArenaConfig, BoxSpec, ControllerConfig, DrifterSpec, TargetSpec},
    controller::{CharacterControllerPlugin, ControllerSystems},
    hazards::{apply_vertical_drift, detect_trigger_crossings, TriggerCrossed, TriggerZone, VerticalDrift},
    spatial::Aabb,
};

/// Visual/debug description of a static box (collision lives in [`ArenaWorld`])
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct ArenaBox {
    pub half_extents: Vec3,
    pub surface: SurfaceTag,
}

/// What [`spawn_arena`] created
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaCounts {
    pub boxes: usize,
    pub targets: usize,
    pub drifters: usize,
}

/// Controller bundle built from config. Returns the controller entity.
pub fn spawn_controller(commands: &mut Commands, config: &ControllerConfig) -> Entity {
    let transform = Transform::from_translation(Vec3::from_array(config.spawn_position))
        .with_rotation(Quat::from_rotation_y(-config.spawn_yaw));

    commands
        .spawn((
            Name::new("Player"),
            PlayerController,
            transform,
            config.tuning.clone(),
            config.attack.clone(),
            config.body,
            CameraPivot {
                offset: Vec3::from_array(config.pivot_offset),
                pitch: 0.0,
            },
        ))
        .id()
}

fn spawn_box(commands: &mut Commands, arena: &mut ArenaWorld, spec: &BoxSpec) {
    let center = Vec3::from_array(spec.center);
    let half_extents = Vec3::from_array(spec.half_extents);
    let entity = commands
        .spawn((
            Name::new(spec.name.clone()),
            Transform::from_translation(center),
            ArenaBox {
                half_extents,
                surface: spec.surface,
            },
        ))
        .id();

    arena.add_static(StaticBox {
        name: spec.name.clone(),
        aabb: Aabb::from_center_half_extents(center, half_extents),
        surface: spec.surface,
        layers: spec.layers,
        entity: Some(entity),
    });
}

fn spawn_target(commands: &mut Commands, arena: &mut ArenaWorld, spec: &TargetSpec) {
    let position = Vec3::from_array(spec.position);
    let mut entity = commands.spawn((
        Name::new(spec.name.clone()),
        Transform::from_translation(position),
        TargetBody {
            radius: spec.radius,
            layers: spec.layers,
        },
        EnemyTarget {
            health: spec.health,
        },
    ));

    match &spec.kind {
        Some(kind) => {
            entity.insert(TargetKind::new(kind.clone()));
        }
        None => warn!("{} has no damage kind; attacks on it will be reported", spec.name),
    }

    // Visible to queries before the first sync runs.
    arena.upsert_body(entity.id(), position, spec.radius, spec.layers);
}

fn spawn_drifter(commands: &mut Commands, spec: &DrifterSpec) {
    commands.spawn((
        Name::new(spec.name.clone()),
        Transform::from_translation(Vec3::from_array(spec.position)),
        VerticalDrift { speed: spec.speed },
        TriggerZone::new(Vec3::from_array(spec.half_extents)),
    ));
}

/// Populate the ECS world and the collision backend from an arena layout.
pub fn spawn_arena(commands: &mut Commands, arena: &mut ArenaWorld, config: &ArenaConfig) -> ArenaCounts {
    for spec in &config.boxes {
        spawn_box(commands, arena, spec);
    }

    let targets = config.all_targets();
    for spec in &targets {
        spawn_target(commands, arena, spec);
    }

    for spec in &config.drifters {
        spawn_drifter(commands, spec);
    }

    ArenaCounts {
        boxes: config.boxes.len(),
        targets: targets.len(),
        drifters: config.drifters.len(),
    }
}

/// Startup: spawn arena and controller from the config resources (defaults if absent)
pub fn spawn_from_config(
    mut commands: Commands,
    mut arena: ResMut<ArenaWorld>,
    controller: Option<Res<ControllerConfig>>,
    layout: Option<Res<ArenaConfig>>,
) {
    let controller = controller.as_deref().cloned().unwrap_or_else(|| {
        warn!("No controller config, using defaults");
        ControllerConfig::default()
    });
    let layout = layout.as_deref().cloned().unwrap_or_else(|| {
        warn!("No arena config, spawning an empty arena");
        ArenaConfig::default()
    });

    let counts = spawn_arena(&mut commands, &mut arena, &layout);
    let player = spawn_controller(&mut commands, &controller);

    info!(
        "Arena ready: {} boxes, {} targets, {} drifters; player {player}",
        counts.boxes, counts.targets, counts.drifters
    );
    debug!(
        "Collision world: {} statics, {} bodies",
        arena.statics().len(),
        arena.body_count()
    );
    commands.insert_resource(counts);
}

/// Arena collision world, arena spawning and the controller running on it
pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArenaWorld>()
            .init_resource::<ArenaCounts>()
            .add_plugins(CharacterControllerPlugin::<ArenaWorld>::default())
            .add_message::<TriggerCrossed>()
            .add_systems(Startup, spawn_from_config)
            .add_systems(
                RunFixedMainLoop,
                sync_target_bodies.in_set(ControllerSystems::SyncBackend),
            )
            .add_systems(Update, (apply_vertical_drift, detect_trigger_crossings).chain());
    }
}
