//! Drifting blocks and trigger volumes placed in the arena.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::components::{CharacterBody, PlayerController};
use crate::spatial::Aabb;

/// Moves an entity straight down at a constant speed (units per second)
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct VerticalDrift {
    pub speed: f32,
}

/// Axis-aligned volume that reports controllers entering and leaving it
#[derive(Component, Clone, Debug, Default)]
pub struct TriggerZone {
    pub half_extents: Vec3,
    /// Controllers overlapping the zone last frame
    occupants: HashSet<Entity>,
}

impl TriggerZone {
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            half_extents,
            occupants: HashSet::new(),
        }
    }

    fn bounds(&self, center: Vec3) -> Aabb {
        Aabb::from_center_half_extents(center, self.half_extents)
    }
}

/// A controller crossed a trigger zone boundary
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerCrossed {
    pub zone: Entity,
    pub body: Entity,
    pub entered: bool,
}

/// `translation.y -= speed * dt`
pub fn drift_down(translation: &mut Vec3, speed: f32, dt: f32) {
    translation.y -= speed * dt;
}

pub fn apply_vertical_drift(time: Res<Time>, mut drifting: Query<(&VerticalDrift, &mut Transform)>) {
    let dt = time.delta_secs();
    for (drift, mut transform) in drifting.iter_mut() {
        drift_down(&mut transform.translation, drift.speed, dt);
    }
}

/// Capsule vs box overlap, treating the capsule as its bounding box
fn capsule_overlaps(bounds: &Aabb, position: Vec3, body: &CharacterBody) -> bool {
    let capsule = Aabb::from_center_half_extents(
        position,
        Vec3::new(body.radius, body.half_height(), body.radius),
    );
    capsule.min.cmple(bounds.max).all() && capsule.max.cmpge(bounds.min).all()
}

/// Diff current occupants against last frame; returns (entered, exited).
pub fn update_occupants(
    zone: &mut TriggerZone,
    zone_center: Vec3,
    bodies: impl IntoIterator<Item = (Entity, Vec3, CharacterBody)>,
) -> (Vec<Entity>, Vec<Entity>) {
    let bounds = zone.bounds(zone_center);
    let now: HashSet<Entity> = bodies
        .into_iter()
        .filter(|(_, position, body)| capsule_overlaps(&bounds, *position, body))
        .map(|(entity, _, _)| entity)
        .collect();

    let mut entered: Vec<Entity> = now.difference(&zone.occupants).copied().collect();
    let mut exited: Vec<Entity> = zone.occupants.difference(&now).copied().collect();
    entered.sort();
    exited.sort();

    zone.occupants = now;
    (entered, exited)
}

pub fn detect_trigger_crossings(
    mut zones: Query<(Entity, &Transform, &mut TriggerZone)>,
    bodies: Query<(Entity, &Transform, &CharacterBody), With<PlayerController>>,
    mut crossings: MessageWriter<TriggerCrossed>,
) {
    for (zone_entity, zone_transform, mut zone) in zones.iter_mut() {
        let (entered, exited) = update_occupants(
            &mut zone,
            zone_transform.translation,
            bodies.iter().map(|(e, t, b)| (e, t.translation, *b)),
        );

        for body in entered {
            info!("Entered trigger {zone_entity} ({body})");
            crossings.write(TriggerCrossed {
                zone: zone_entity,
                body,
                entered: true,
            });
        }
        for body in exited {
            info!("Exited trigger {zone_entity} ({body})");
            crossings.write(TriggerCrossed {
                zone: zone_entity,
                body,
                entered: false,
            });
        }
    }
}
