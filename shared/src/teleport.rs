//! Look-target teleport (secondary fire).

use bevy::prelude::*;

use crate::{
    backend::{MovementService, SpatialQuery},
    components::{CameraPivot, ControllerTuning, SurfaceTag},
    input::InputFrame,
    player::TELEPORT_HEIGHT_OFFSET,
};

/// Teleport the body onto the ground the camera pivot is looking at.
///
/// Only acts while fire2 is held and the ray hits a `Ground` surface. Collision is
/// disabled around the snap so the capsule sweep does not fight the new position.
/// Returns the new position when the body moved.
pub fn teleport_to_look_target<B: SpatialQuery + MovementService + ?Sized>(
    backend: &mut B,
    body: Entity,
    input: &InputFrame,
    tuning: &ControllerTuning,
    pivot: &CameraPivot,
    transform: &mut Transform,
) -> Option<Vec3> {
    if !input.fire2_held {
        return None;
    }

    let eye = pivot.world_transform(transform);
    let hit = backend.raycast(eye.translation, eye.forward(), tuning.teleport_range)?;
    if hit.surface != SurfaceTag::Ground {
        return None;
    }

    backend.set_collision_enabled(body, false);
    transform.translation = hit.point + Vec3::Y * TELEPORT_HEIGHT_OFFSET;
    backend.set_collision_enabled(body, true);

    Some(transform.translation)
}
