//! Arena visuals
//!
//! Collision and gameplay entities are spawned by the shared arena plugin;
//! this only attaches meshes to them as they appear.

use bevy::prelude::*;
use shared::{ArenaBox, SurfaceTag, TargetBody, TargetKind, TriggerZone};

/// Lights and background
pub fn spawn_lighting(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            color: Color::srgb(1.0, 0.98, 0.92),
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.7, 0.3, 0.0)),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.9, 1.0),
        brightness: 300.0,
        affects_lightmapped_meshes: true,
    });
    commands.insert_resource(ClearColor(Color::srgb(0.55, 0.7, 0.9)));
}

fn surface_color(surface: SurfaceTag) -> Color {
    match surface {
        SurfaceTag::Ground => Color::srgb(0.45, 0.55, 0.35),
        SurfaceTag::Wall => Color::srgb(0.6, 0.6, 0.62),
        SurfaceTag::Body => Color::srgb(0.8, 0.3, 0.3),
    }
}

pub fn attach_box_meshes(
    mut commands: Commands,
    boxes: Query<(Entity, &ArenaBox), Added<ArenaBox>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, arena_box) in boxes.iter() {
        let size = arena_box.half_extents * 2.0;
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: surface_color(arena_box.surface),
                perceptual_roughness: 0.9,
                ..default()
            })),
        ));
    }
}

pub fn attach_target_meshes(
    mut commands: Commands,
    targets: Query<(Entity, &TargetBody, Option<&TargetKind>), Added<TargetBody>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, body, kind) in targets.iter() {
        // Targets nothing can damage are drawn grey.
        let color = match kind {
            Some(_) => surface_color(SurfaceTag::Body),
            None => Color::srgb(0.4, 0.4, 0.4),
        };
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Sphere::new(body.radius))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                ..default()
            })),
        ));
    }
}

pub fn attach_trigger_meshes(
    mut commands: Commands,
    zones: Query<(Entity, &TriggerZone), Added<TriggerZone>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, zone) in zones.iter() {
        let size = zone.half_extents * 2.0;
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgba(0.2, 0.5, 1.0, 0.3),
                alpha_mode: AlphaMode::Blend,
                ..default()
            })),
        ));
    }
}
