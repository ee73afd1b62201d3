//! First-person camera riding the controller's camera pivot

use bevy::prelude::*;
use shared::{CameraPivot, PlayerController};

/// Vertical field of view
const FOV: f32 = 70.0 * std::f32::consts::PI / 180.0;

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: FOV,
            ..default()
        }),
        Transform::from_xyz(0.0, 2.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Snap the camera onto the pivot's world transform
pub fn follow_pivot(
    player_query: Query<(&Transform, &CameraPivot), (With<PlayerController>, Without<Camera3d>)>,
    mut camera_query: Query<&mut Transform, (With<Camera3d>, Without<PlayerController>)>,
) {
    let Some((body, pivot)) = player_query.iter().next() else {
        return;
    };
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    *camera_transform = pivot.world_transform(body);
}
