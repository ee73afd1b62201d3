//! Player-related constants

use std::time::Duration;

/// Fixed physics rate (movement integration), in Hz.
pub const FIXED_TIMESTEP_HZ: f64 = 50.0;

/// Length of one fixed tick
pub fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_TIMESTEP_HZ)
}

/// Vertical velocity the character is pinned to while grounded.
/// Keeps the capsule pressed into the floor so the next sweep still reports contact.
pub const GROUNDED_VERTICAL_VELOCITY: f32 = -1.0;

/// Height above a teleport hit point the body is placed at.
pub const TELEPORT_HEIGHT_OFFSET: f32 = 1.0;

/// Player height (for capsule)
pub const PLAYER_HEIGHT: f32 = 2.0;

/// Player radius (for capsule)
pub const PLAYER_RADIUS: f32 = 0.5;

/// Camera pivot offset from the body origin (eye level, local space)
pub const CAMERA_PIVOT_OFFSET: [f32; 3] = [0.0, 0.6, 0.0];

/// Default pitch clamp, just shy of straight up/down
pub const DEFAULT_PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Spawn position for the player (above the arena floor)
pub const SPAWN_POSITION: [f32; 3] = [0.0, 2.0, 0.0];
