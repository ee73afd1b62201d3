//! Melee attack: one sphere overlap in front of the body.
//!
//! Every candidate on the damageable layers is dispatched through the
//! [`DamageRegistry`]. Candidates whose kind has no handler are reported as
//! configuration errors and left untouched.

pub mod damage;

use bevy::prelude::*;

use crate::{
    backend::SpatialQuery,
    components::{AttackParams, TargetKind},
    error::ConfigError,
};

pub use damage::{DamageEffect, DamageRegistry, Damageable, Indestructible, RemoveOnHit};

/// Centre and radius of the hit sphere for a body pose
pub fn attack_sphere(body: &Transform, params: &AttackParams) -> (Vec3, f32) {
    (
        body.translation + *body.forward() * params.centre_offset,
        params.radius,
    )
}

/// Outcome of one attack
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttackReport {
    /// Candidates that took damage, with what the hit did
    pub hits: Vec<(Entity, DamageEffect)>,
    /// Candidates on a damageable layer without a damage handler
    pub errors: Vec<ConfigError>,
}

impl AttackReport {
    pub fn removed(&self) -> impl Iterator<Item = Entity> + '_ {
        self.hits
            .iter()
            .filter(|(_, effect)| *effect == DamageEffect::Remove)
            .map(|(entity, _)| *entity)
    }
}

/// Run the overlap query and invoke `take_damage` once per capable candidate.
///
/// `kind_of` resolves a candidate's registry key; `name_of` labels it in error reports.
pub fn resolve_attack<'a, Q: SpatialQuery + ?Sized>(
    query: &Q,
    registry: &DamageRegistry,
    body: &Transform,
    params: &AttackParams,
    kind_of: impl Fn(Entity) -> Option<&'a TargetKind>,
    name_of: impl Fn(Entity) -> String,
) -> AttackReport {
    let (center, radius) = attack_sphere(body, params);
    let mut report = AttackReport::default();

    for candidate in query.overlap_sphere(center, radius, params.targets) {
        debug!("Attack found a collider: {}", name_of(candidate));
        match kind_of(candidate).and_then(|kind| registry.handler(kind)) {
            Some(handler) => {
                let effect = handler.take_damage(candidate);
                report.hits.push((candidate, effect));
            }
            None => report.errors.push(ConfigError::MissingDamageCapability {
                entity: candidate,
                name: name_of(candidate),
            }),
        }
    }

    report
}

/// Debug toggle for drawing the attack hit sphere
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackDebugDraw(pub bool);

/// Debug: draw the hit sphere of every controller while the toggle is on
pub fn draw_attack_hit_sphere(
    mut gizmos: Gizmos,
    debug_draw: Res<AttackDebugDraw>,
    controllers: Query<(&Transform, &AttackParams)>,
) {
    if !debug_draw.0 {
        return;
    }

    for (transform, params) in controllers.iter() {
        let (center, radius) = attack_sphere(transform, params);
        gizmos.sphere(
            Isometry3d::from_translation(center),
            radius,
            Color::srgba(1.0, 0.3, 0.0, 0.8),
        );
    }
}
