//! Configuration errors.
//!
//! Every failure the controller can surface is a configuration problem:
//! a collaborator that was never attached, a target that cannot take damage,
//! or a config file that does not parse. Runtime numeric input is never rejected.

use bevy::prelude::Entity;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A controller entity is missing a component it cannot run without.
    MissingCollaborator {
        entity: Entity,
        collaborator: &'static str,
    },
    /// The collision backend resource was never inserted.
    MissingBackend { backend: &'static str },
    /// A candidate on the damageable layer has no registered damage handler.
    MissingDamageCapability { entity: Entity, name: String },
    /// A tuning value lies outside its allowed range.
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingCollaborator {
                entity,
                collaborator,
            } => write!(f, "controller {entity} has no {collaborator}"),
            ConfigError::MissingBackend { backend } => {
                write!(f, "collision backend {backend} is not installed")
            }
            ConfigError::MissingDamageCapability { entity, name } => write!(
                f,
                "{name} ({entity}): object on a damageable layer has no damage handler"
            ),
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} = {value} is outside [{min}, {max}]"),
            ConfigError::Read { path, message } => {
                write!(f, "failed to read {}: {message}", path.display())
            }
            ConfigError::Parse { path, message } => {
                write!(f, "failed to parse {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
