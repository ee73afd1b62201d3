//! Arena collision world.
//!
//! A lightweight [`CollisionBackend`](crate::backend::CollisionBackend):
//! - Static axis-aligned boxes (floors, walls, platforms) in a spatial hash
//! - Dynamic target spheres mirrored from ECS every frame
//! - Capsule sweep with horizontal push-out and ground snapping
//!
//! This is intentionally simple (boxes and spheres only). It is not a rigid-body
//! solver: nothing here ever pushes back on targets.

use bevy::prelude::*;
use std::collections::{BTreeMap, HashSet};

use crate::{
    backend::{MoveReport, MovementService, RayHit, SpatialQuery},
    components::{CharacterBody, CollisionLayers, SurfaceTag, TargetBody},
    spatial::{Aabb, SpatialGrid},
};

/// Tops at most this far above the feet are stepped onto instead of blocking.
pub const STEP_UP_HEIGHT: f32 = 0.3;

/// Tolerance used when deciding whether the capsule rests on a surface.
pub const GROUND_SKIN: f32 = 0.01;

/// A static box collider
#[derive(Clone, Debug, PartialEq)]
pub struct StaticBox {
    pub name: String,
    pub aabb: Aabb,
    pub surface: SurfaceTag,
    pub layers: CollisionLayers,
    /// Entity owning this box, if it should be reported by overlap queries
    pub entity: Option<Entity>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SphereBody {
    center: Vec3,
    radius: f32,
    layers: CollisionLayers,
}

/// Collision world for the arena.
#[derive(Resource, Default, Debug)]
pub struct ArenaWorld {
    grid: SpatialGrid,
    /// Index-aligned with `grid`
    statics: Vec<StaticBox>,
    /// Ordered by entity so query results are deterministic
    bodies: BTreeMap<Entity, SphereBody>,
    collision_disabled: HashSet<Entity>,
}

impl ArenaWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_static(&mut self, collider: StaticBox) -> usize {
        let idx = self.grid.insert(collider.aabb);
        self.statics.push(collider);
        idx
    }

    pub fn statics(&self) -> &[StaticBox] {
        &self.statics
    }

    /// Insert or move a dynamic sphere
    pub fn upsert_body(&mut self, entity: Entity, center: Vec3, radius: f32, layers: CollisionLayers) {
        self.bodies.insert(
            entity,
            SphereBody {
                center,
                radius,
                layers,
            },
        );
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_collision_enabled(&self, entity: Entity) -> bool {
        !self.collision_disabled.contains(&entity)
    }

    fn statics_near(&self, area: Aabb) -> impl Iterator<Item = &StaticBox> {
        self.grid
            .query(area)
            .into_iter()
            .filter_map(move |idx| self.statics.get(idx))
    }

    /// Push the capsule out of box sides it overlaps (XZ only).
    fn resolve_walls(&self, position: &mut Vec3, shape: &CharacterBody) {
        let half = shape.half_height();
        let feet = position.y - half;
        let head = position.y + half;
        let area = Aabb::from_center_half_extents(
            *position,
            Vec3::new(shape.radius, half, shape.radius),
        );

        for collider in self.statics_near(area) {
            let b = collider.aabb;
            // Floors and low steps are handled by ground snapping.
            if b.max.y <= feet + STEP_UP_HEIGHT || b.min.y >= head {
                continue;
            }

            let flat = Vec2::new(position.x, position.z);
            let closest = Vec2::new(
                flat.x.clamp(b.min.x, b.max.x),
                flat.y.clamp(b.min.z, b.max.z),
            );
            let delta = flat - closest;
            let dist = delta.length();
            if dist >= shape.radius {
                continue;
            }

            let push = if dist > 1e-5 {
                delta / dist * (shape.radius - dist)
            } else {
                // Centre inside the footprint: leave through the nearest side.
                let exits = [
                    (flat.x - b.min.x + shape.radius, Vec2::NEG_X),
                    (b.max.x - flat.x + shape.radius, Vec2::X),
                    (flat.y - b.min.z + shape.radius, Vec2::NEG_Y),
                    (b.max.z - flat.y + shape.radius, Vec2::Y),
                ];
                let (depth, dir) = exits
                    .into_iter()
                    .fold((f32::INFINITY, Vec2::ZERO), |best, e| if e.0 < best.0 { e } else { best });
                dir * depth
            };

            position.x += push.x;
            position.z += push.y;
        }
    }

    /// Highest walkable top under the capsule that it crossed or reached this sweep.
    fn support_height(&self, position: Vec3, prev_feet: f32, feet: f32) -> Option<f32> {
        let area = Aabb {
            min: Vec3::new(position.x, feet - GROUND_SKIN, position.z),
            max: Vec3::new(position.x, prev_feet + STEP_UP_HEIGHT, position.z),
        };
        self.statics_near(area)
            .map(|c| c.aabb)
            .filter(|b| b.footprint_contains(position, 0.0))
            .filter(|b| b.max.y <= prev_feet + STEP_UP_HEIGHT && b.max.y >= feet - GROUND_SKIN)
            .map(|b| b.max.y)
            .fold(None, |best: Option<f32>, top| Some(best.map_or(top, |h| h.max(top))))
    }

    /// Lowest ceiling the head crossed this sweep.
    fn ceiling_height(&self, position: Vec3, prev_head: f32, head: f32) -> Option<f32> {
        let area = Aabb {
            min: Vec3::new(position.x, prev_head - GROUND_SKIN, position.z),
            max: Vec3::new(position.x, head, position.z),
        };
        self.statics_near(area)
            .map(|c| c.aabb)
            .filter(|b| b.footprint_contains(position, 0.0))
            .filter(|b| b.min.y >= prev_head - GROUND_SKIN && b.min.y < head)
            .map(|b| b.min.y)
            .fold(None, |best: Option<f32>, low| Some(best.map_or(low, |h| h.min(low))))
    }
}

impl SpatialQuery for ArenaWorld {
    fn raycast(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit> {
        let dir = *direction;
        let mut best: Option<RayHit> = None;
        let mut consider = |hit: RayHit| {
            if best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(hit);
            }
        };

        for collider in &self.statics {
            if let Some((t, normal)) = collider.aabb.ray_intersection(origin, dir, max_distance) {
                consider(RayHit {
                    point: origin + dir * t,
                    normal,
                    distance: t,
                    surface: collider.surface,
                    entity: collider.entity,
                });
            }
        }

        for (&entity, sphere) in &self.bodies {
            if let Some(t) = ray_sphere(origin, dir, sphere.center, sphere.radius, max_distance) {
                let point = origin + dir * t;
                consider(RayHit {
                    point,
                    normal: (point - sphere.center).normalize_or_zero(),
                    distance: t,
                    surface: SurfaceTag::Body,
                    entity: Some(entity),
                });
            }
        }

        best
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: CollisionLayers) -> Vec<Entity> {
        let radius = radius.max(0.0);
        let area = Aabb::from_center_half_extents(center, Vec3::splat(radius));
        let mut found = Vec::new();

        for collider in self.statics_near(area) {
            let Some(entity) = collider.entity else {
                continue;
            };
            if collider.layers.intersects(filter) && collider.aabb.intersects_sphere(center, radius) {
                found.push(entity);
            }
        }

        for (&entity, sphere) in &self.bodies {
            let reach = radius + sphere.radius;
            if sphere.layers.intersects(filter) && sphere.center.distance_squared(center) <= reach * reach {
                found.push(entity);
            }
        }

        let mut seen = HashSet::new();
        found.retain(|e| seen.insert(*e));
        found
    }
}

impl MovementService for ArenaWorld {
    fn move_and_collide(
        &mut self,
        body: Entity,
        transform: &mut Transform,
        shape: &CharacterBody,
        motion: Vec3,
    ) -> MoveReport {
        let half = shape.half_height();
        let start = transform.translation;
        let mut position = start + motion;

        if !self.is_collision_enabled(body) {
            transform.translation = position;
            return MoveReport { grounded: false };
        }

        // Vertical first, so walls are tested at the height the capsule ends up at.
        let mut grounded = false;
        if motion.y <= 0.0 {
            if let Some(top) = self.support_height(position, start.y - half, position.y - half) {
                position.y = top + half;
                grounded = true;
            }
        } else if let Some(ceiling) = self.ceiling_height(position, start.y + half, position.y + half) {
            position.y = ceiling - half;
        }

        self.resolve_walls(&mut position, shape);

        transform.translation = position;
        MoveReport { grounded }
    }

    fn set_collision_enabled(&mut self, body: Entity, enabled: bool) {
        if enabled {
            self.collision_disabled.remove(&body);
        } else {
            self.collision_disabled.insert(body);
        }
    }
}

/// Distance along a normalized ray to the first sphere intersection
fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32, max_distance: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let mut t = -b - root;
    if t < 0.0 {
        t = -b + root;
    }
    (t >= 0.0 && t <= max_distance).then_some(t)
}

/// Mirror target spheres into the arena and drop the ones that no longer exist.
pub fn sync_target_bodies(
    mut arena: ResMut<ArenaWorld>,
    targets: Query<(Entity, &Transform, &TargetBody)>,
) {
    let mut alive = HashSet::new();
    for (entity, transform, body) in targets.iter() {
        arena.upsert_body(entity, transform.translation, body.radius, body.layers);
        alive.insert(entity);
    }
    arena.bodies.retain(|entity, _| alive.contains(entity));
}
