//! ECS components shared by the sandbox and the client

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::input::InputFrame;
use crate::player::{CAMERA_PIVOT_OFFSET, DEFAULT_PITCH_LIMIT, PLAYER_HEIGHT, PLAYER_RADIUS};

// =============================================================================
// CONTROLLER
// =============================================================================

/// Marker for entities driven by the character motion controller
#[derive(Component, Clone, Debug, Default)]
#[require(MotionState, InputFrame)]
pub struct PlayerController;

/// Per-step motion state, owned by the controller.
///
/// `velocity` is a displacement per fixed step: it is handed to the movement
/// service as-is, without another multiplication by `dt`.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct MotionState {
    pub velocity: Vec3,
    /// Copied from the last movement report
    pub grounded: bool,
}

/// Movement and look tuning for one controller
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ControllerTuning {
    pub acceleration: f32,
    /// Fraction of velocity removed every fixed step (0..=1)
    pub damping: f32,
    pub gravity: f32,
    pub jump_thrust: f32,
    /// Yaw speed per unit of horizontal look input (radians/second)
    pub rotation_speed: f32,
    /// Pitch speed per unit of vertical look input (radians/second)
    pub vert_sensitivity: f32,
    /// Absolute pitch clamp for the camera pivot (radians)
    pub pitch_limit: f32,
    /// Max distance of the look-target teleport ray
    pub teleport_range: f32,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            acceleration: 1.0,
            damping: 0.1,
            gravity: 0.5,
            jump_thrust: 1.25,
            rotation_speed: 2.5,
            vert_sensitivity: 1.5,
            pitch_limit: DEFAULT_PITCH_LIMIT,
            teleport_range: 500.0,
        }
    }
}

/// Melee hit-sphere parameters. Constant at runtime.
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AttackParams {
    /// Distance of the sphere centre in front of the body
    pub centre_offset: f32,
    pub radius: f32,
    /// Layers that count as damageable
    pub targets: CollisionLayers,
}

impl Default for AttackParams {
    fn default() -> Self {
        Self {
            centre_offset: 1.0,
            radius: 1.0,
            targets: CollisionLayers::ENEMY,
        }
    }
}

/// Camera anchor attached to the body. Yaw comes from the body; the pivot only pitches.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct CameraPivot {
    /// Local offset from the body origin
    pub offset: Vec3,
    /// Nose-up pitch in radians
    pub pitch: f32,
}

impl Default for CameraPivot {
    fn default() -> Self {
        Self {
            offset: Vec3::from_array(CAMERA_PIVOT_OFFSET),
            pitch: 0.0,
        }
    }
}

impl CameraPivot {
    /// Pivot transform relative to the body
    pub fn local_transform(&self) -> Transform {
        Transform::from_translation(self.offset).with_rotation(Quat::from_rotation_x(self.pitch))
    }

    /// Pivot transform in world space for a given body transform
    pub fn world_transform(&self, body: &Transform) -> Transform {
        body.mul_transform(self.local_transform())
    }
}

/// Upright capsule used by the movement service
#[derive(Component, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CharacterBody {
    pub radius: f32,
    pub height: f32,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            radius: PLAYER_RADIUS,
            height: PLAYER_HEIGHT,
        }
    }
}

impl CharacterBody {
    /// Distance from the capsule centre (entity origin) to its feet
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }
}

// =============================================================================
// COLLISION TAGS
// =============================================================================

/// Bitmask of collision layers
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CollisionLayers(pub u32);

impl CollisionLayers {
    pub const NONE: Self = Self(0);
    pub const DEFAULT: Self = Self(1 << 0);
    pub const PLAYER: Self = Self(1 << 1);
    pub const ENEMY: Self = Self(1 << 2);
    pub const ALL: Self = Self(u32::MAX);

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What kind of surface a ray hit
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SurfaceTag {
    /// Walkable floor; the only valid teleport destination
    #[default]
    Ground,
    Wall,
    /// A dynamic body (targets)
    Body,
}

// =============================================================================
// TARGETS
// =============================================================================

/// Registry key of a damageable entity type (see [`crate::combat::DamageRegistry`])
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetKind(pub String);

impl TargetKind {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Sphere collider for a target, synced into the collision backend every frame
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct TargetBody {
    pub radius: f32,
    pub layers: CollisionLayers,
}

/// Enemy marker.
///
/// `health` is declared for content authors but no system reads or decrements it:
/// a hit always removes the enemy.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct EnemyTarget {
    pub health: f32,
}

/// Set when a target has been destroyed; the owning loop despawns it.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct PendingRemoval;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_filter_matches_shared_bits() {
        let enemy_or_player = CollisionLayers::ENEMY.union(CollisionLayers::PLAYER);
        assert!(enemy_or_player.intersects(CollisionLayers::ENEMY));
        assert!(!CollisionLayers::DEFAULT.intersects(CollisionLayers::ENEMY));
        assert!(!CollisionLayers::NONE.intersects(CollisionLayers::ALL));
    }

    #[test]
    fn pivot_world_transform_follows_body_yaw() {
        let body = Transform::from_xyz(1.0, 0.0, 0.0).looking_to(Vec3::Z, Vec3::Y);
        let pivot = CameraPivot {
            offset: Vec3::new(0.0, 0.5, 0.0),
            pitch: 0.0,
        };
        let world = pivot.world_transform(&body);
        assert!((world.translation - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-5);
        assert!((*world.forward() - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn positive_pitch_looks_up() {
        let pivot = CameraPivot {
            offset: Vec3::ZERO,
            pitch: 0.5,
        };
        let world = pivot.world_transform(&Transform::IDENTITY);
        assert!(world.forward().y > 0.0);
    }
}
