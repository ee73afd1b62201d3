//! Look rotation shared by every controller host (sandbox and client).
//!
//! Angles are computed in the controller's convention, where positive yaw turns
//! the body to its right (clockwise seen from above) and positive pitch tilts the
//! camera nose-down. Bevy rotations are counter-clockwise, so both are negated
//! when applied to transforms.

use bevy::prelude::*;

use crate::components::{CameraPivot, ControllerTuning};

/// Rotation produced by one frame of look input
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookStep {
    /// Clockwise yaw in radians
    pub yaw: f32,
    /// Nose-down pitch in radians
    pub pitch: f32,
}

/// `yaw = look.x * rotation_speed * dt`, `pitch = -look.y * vert_sensitivity * dt`
pub fn look_step(look: Vec2, tuning: &ControllerTuning, dt: f32) -> LookStep {
    LookStep {
        yaw: look.x * tuning.rotation_speed * dt,
        pitch: -look.y * tuning.vert_sensitivity * dt,
    }
}

/// Apply look input: yaw the body and pitch the camera pivot.
///
/// Pivot pitch is clamped to `tuning.pitch_limit` so the camera cannot loop over.
pub fn apply_look(
    look: Vec2,
    tuning: &ControllerTuning,
    body: &mut Transform,
    pivot: &mut CameraPivot,
    dt: f32,
) -> LookStep {
    let step = look_step(look, tuning, dt);

    body.rotate_y(-step.yaw);

    let limit = tuning.pitch_limit.abs();
    pivot.pitch = (pivot.pitch - step.pitch).clamp(-limit, limit);

    step
}
