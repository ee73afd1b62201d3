//! Damage capability registry
//!
//! Targets do not carry behaviour themselves. Each one names its kind
//! ([`TargetKind`]) and the registry maps kinds to a [`Damageable`] handler.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::TargetKind;

/// What a hit does to its target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageEffect {
    /// Remove the target from the simulation
    Remove,
    /// The hit registered but changes nothing
    Absorbed,
}

/// A damage-taking capability
pub trait Damageable: Send + Sync + 'static {
    fn take_damage(&self, target: Entity) -> DamageEffect;
}

/// Unconditionally destroys the target. Health is never consulted.
#[derive(Clone, Copy, Debug, Default)]
pub struct RemoveOnHit;

impl Damageable for RemoveOnHit {
    fn take_damage(&self, target: Entity) -> DamageEffect {
        debug!("{target} takes damage and is marked for removal");
        DamageEffect::Remove
    }
}

/// Registers hits without effect (training dummies)
#[derive(Clone, Copy, Debug, Default)]
pub struct Indestructible;

impl Damageable for Indestructible {
    fn take_damage(&self, target: Entity) -> DamageEffect {
        debug!("{target} absorbs the hit");
        DamageEffect::Absorbed
    }
}

/// Kind id used by enemies
pub const ENEMY_KIND: &str = "enemy";

/// Kind id used by training dummies
pub const DUMMY_KIND: &str = "dummy";

/// Damage handlers keyed by [`TargetKind`] id
#[derive(Resource, Default)]
pub struct DamageRegistry {
    handlers: HashMap<String, Box<dyn Damageable>>,
}

impl DamageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in kinds (`enemy`, `dummy`)
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        registry.register(ENEMY_KIND, RemoveOnHit);
        registry.register(DUMMY_KIND, Indestructible);
        registry
    }

    /// Register (or replace) the handler for a kind
    pub fn register(&mut self, kind: impl Into<String>, handler: impl Damageable) {
        self.handlers.insert(kind.into(), Box::new(handler));
    }

    pub fn handler(&self, kind: &TargetKind) -> Option<&dyn Damageable> {
        self.handlers.get(kind.id()).map(|h| h.as_ref())
    }
}
