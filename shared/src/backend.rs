//! Collision services the controller depends on.
//!
//! The controller never touches a physics world directly. It asks a backend to
//! sweep the character capsule and to answer ray/overlap queries, so the same
//! systems run against [`crate::arena::ArenaWorld`] or a test double.

use bevy::prelude::*;

use crate::components::{CharacterBody, CollisionLayers, SurfaceTag};

/// Closest hit returned by [`SpatialQuery::raycast`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub surface: SurfaceTag,
    /// Entity owning the collider, if any (static geometry has none)
    pub entity: Option<Entity>,
}

/// Result of one capsule sweep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveReport {
    /// The capsule ended the sweep resting on a walkable surface
    pub grounded: bool,
}

pub trait SpatialQuery {
    fn raycast(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit>;

    /// All colliders intersecting the sphere whose layers intersect `filter`
    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: CollisionLayers) -> Vec<Entity>;
}

pub trait MovementService {
    /// Move `transform` by `motion`, resolving collisions unless disabled for `body`.
    fn move_and_collide(
        &mut self,
        body: Entity,
        transform: &mut Transform,
        shape: &CharacterBody,
        motion: Vec3,
    ) -> MoveReport;

    fn set_collision_enabled(&mut self, body: Entity, enabled: bool);
}

/// A resource providing both collision services
pub trait CollisionBackend: SpatialQuery + MovementService + Resource {}

impl<T> CollisionBackend for T where T: SpatialQuery + MovementService + Resource {}
