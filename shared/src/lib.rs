//! Shared controller core - used by the headless sandbox and the windowed client
//!
//! Contains:
//! - Controller components, input frame and tuning
//! - Look, motion, teleport and melee attack logic
//! - Damage registry and collision backend traits
//! - The arena collision world and its RON configuration
//! - Bevy plugins wiring it all into schedules

pub mod arena;
pub mod backend;
pub mod combat;
pub mod components;
pub mod config;
pub mod controller;
pub mod error;
pub mod hazards;
pub mod input;
pub mod level;
pub mod movement;
pub mod physics;
pub mod player;
pub mod spatial;
pub mod teleport;

pub use arena::ArenaWorld;
pub use backend::{CollisionBackend, MoveReport, MovementService, RayHit, SpatialQuery};
pub use combat::{AttackDebugDraw, DamageEffect, DamageRegistry, Damageable};
pub use components::*;
pub use config::{ArenaConfig, ControllerConfig};
pub use controller::{AttackResolved, CharacterControllerPlugin, ControllerSystems};
pub use error::ConfigError;
pub use hazards::{TriggerCrossed, TriggerZone, VerticalDrift};
pub use input::{ButtonSample, ControllerAction, ControllerInput, InputFrame};
pub use level::{ArenaBox, ArenaCounts, ArenaPlugin};
pub use player::*;
